//! Truncation Tests
//!
//! Every proper prefix of a valid stream must fail to load with a format or
//! I/O error: never a panic, never a tree with missing entries.

use atlastree::{AtlasError, BTree, BincodeCodec, BytesCodec, Config, ValueCodec};
use bytes::Bytes;

// =============================================================================
// Helper Functions
// =============================================================================

fn assert_every_prefix_fails<V, C: ValueCodec<V>>(data: &[u8], codec: &C, config: Config) {
    for cut in 0..data.len() {
        let result = BTree::<V>::load_with_config(&mut &data[..cut], codec, config);
        match result {
            Err(AtlasError::Format(_)) | Err(AtlasError::Io(_)) => {}
            Err(other) => panic!("prefix of {} bytes: unexpected error {:?}", cut, other),
            Ok(tree) => panic!(
                "prefix of {} bytes loaded a tree with {} items",
                cut,
                tree.len()
            ),
        }
    }

    // The full stream still loads
    assert!(BTree::<V>::load_with_config(&mut &data[..], codec, config).is_ok());
}

// =============================================================================
// Truncation Tests
// =============================================================================

#[test]
fn test_truncated_empty_tree_header() {
    let tree: BTree<Bytes> = BTree::new();
    let mut data = Vec::new();
    tree.save(&mut data, &BytesCodec).unwrap();

    assert_every_prefix_fails::<Bytes, _>(&data, &BytesCodec, Config::default());
}

#[test]
fn test_truncated_single_leaf() {
    let mut tree = BTree::new();
    for i in 0..20 {
        tree.set(format!("key{}", i), Bytes::from(format!("value{}", i)));
    }
    let mut data = Vec::new();
    tree.save(&mut data, &BytesCodec).unwrap();

    assert_every_prefix_fails::<Bytes, _>(&data, &BytesCodec, Config::default());
}

#[test]
fn test_truncated_two_level_tree() {
    let mut tree = BTree::new();
    for i in 0..400 {
        tree.set(format!("key{:03}", i), Bytes::from(vec![i as u8; i % 7]));
    }
    assert_eq!(tree.height(), 1);
    let mut data = Vec::new();
    tree.save(&mut data, &BytesCodec).unwrap();

    assert_every_prefix_fails::<Bytes, _>(&data, &BytesCodec, Config::default());
}

#[test]
fn test_truncated_deep_tree_with_bincode_values() {
    let config = Config::builder().max_items(3).build().unwrap();
    let mut tree = BTree::with_config(config);
    for i in 0..200u64 {
        tree.set(i.to_be_bytes().to_vec(), (i, format!("v{}", i)));
    }
    assert!(tree.height() >= 3);

    let codec = BincodeCodec::<(u64, String)>::new();
    let mut data = Vec::new();
    tree.save(&mut data, &codec).unwrap();

    assert_every_prefix_fails::<(u64, String), _>(&data, &codec, config);
}

#[test]
fn test_corrupt_key_length_does_not_allocate() {
    let mut tree = BTree::new();
    tree.set("key", Bytes::from_static(b"value"));
    let mut data = Vec::new();
    tree.save(&mut data, &BytesCodec).unwrap();

    // Header (16) + item count (1), then the key length
    data[17..25].copy_from_slice(&u64::MAX.to_be_bytes());

    let result: atlastree::Result<BTree<Bytes>> = BTree::load(&mut data.as_slice(), &BytesCodec);
    assert!(matches!(result, Err(AtlasError::Format(_))));
}
