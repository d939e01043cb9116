//! Forest serialization round-trip (spec 8.5): build a minimal forest,
//! serialize it, parse it back, and check the coder/decoder still agree.

use v2f_forest::{build_minimal_forest, decode_block, encode_block, read_forest, write_forest};

#[test]
fn serialized_forest_codes_identically_to_the_original() {
    let original = build_minimal_forest(1).unwrap();

    let mut buf = Vec::new();
    write_forest(&mut buf, &original).unwrap();
    let parsed = read_forest(&mut std::io::Cursor::new(buf)).unwrap();

    let symbols: Vec<u32> = (0..=255).collect();
    let encoded_original = encode_block(&original, &symbols).unwrap();
    let encoded_parsed = encode_block(&parsed, &symbols).unwrap();
    assert_eq!(encoded_original, encoded_parsed);

    let decoded = decode_block(&parsed, &encoded_parsed, symbols.len()).unwrap();
    assert_eq!(decoded, symbols);
}

#[test]
fn serialized_2_byte_forest_round_trips() {
    let original = build_minimal_forest(2).unwrap();

    let mut buf = Vec::new();
    write_forest(&mut buf, &original).unwrap();
    let parsed = read_forest(&mut std::io::Cursor::new(buf)).unwrap();

    let symbols: Vec<u32> = vec![0, 1, 256, 12345, 65535];
    let encoded = encode_block(&parsed, &symbols).unwrap();
    let decoded = decode_block(&parsed, &encoded, symbols.len()).unwrap();
    assert_eq!(decoded, symbols);
}
