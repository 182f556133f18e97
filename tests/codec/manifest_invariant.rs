//! Field 1.003 always lists exactly the stored records, in key order,
//! whatever sequence of edits produced the file.

use nistcodec::{Manifest, MergePolicy, NistFile, RecordKey, RecordType};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Edit {
    Add(RecordType, u32),
    Remove(usize),
    Move(usize, u32),
}

fn edit() -> impl Strategy<Value = Edit> {
    let record_type = prop::sample::select(vec![2u8, 4, 9, 10, 13, 14]);
    prop_oneof![
        3 => (record_type, 0u32..8).prop_map(|(rt, idc)| Edit::Add(rt, idc)),
        1 => any::<usize>().prop_map(Edit::Remove),
        1 => (any::<usize>(), 0u32..8).prop_map(|(n, to)| Edit::Move(n, to)),
    ]
}

fn apply(file: &mut NistFile, edit: &Edit) {
    let stored: Vec<RecordKey> = file.keys().skip(1).collect();
    let pick = |n: usize| stored.get(n % stored.len().max(1)).copied();
    // Rejected edits (duplicates, missing keys) leave the file unchanged
    match *edit {
        Edit::Add(rt, idc) => {
            let _ = file.add(rt, idc, [(3, "0")]);
        }
        Edit::Remove(n) => {
            if let Some(key) = pick(n) {
                let _ = file.remove(key.record_type, key.idc);
            }
        }
        Edit::Move(n, to) => {
            if let Some(key) = pick(n) {
                let _ = file.move_idc(key.record_type, key.idc, to);
            }
        }
    }
}

fn assert_manifest_matches(file: &NistFile) -> Result<(), TestCaseError> {
    let listed = Manifest::decode(file.header().field(3).unwrap()).unwrap();
    let stored: Vec<RecordKey> = file.keys().skip(1).collect();
    prop_assert_eq!(listed.entries(), stored.as_slice());
    prop_assert!(listed.is_canonical());
    Ok(())
}

proptest! {
    #[test]
    fn manifest_tracks_every_edit(edits in prop::collection::vec(edit(), 0..24)) {
        let mut file = NistFile::new();
        for e in &edits {
            apply(&mut file, e);
            assert_manifest_matches(&file)?;
        }
    }

    #[test]
    fn manifest_tracks_merges(
        left in prop::collection::vec(edit(), 0..12),
        right in prop::collection::vec(edit(), 0..12),
    ) {
        let mut a = NistFile::new();
        let mut b = NistFile::new();
        left.iter().for_each(|e| apply(&mut a, e));
        right.iter().for_each(|e| apply(&mut b, e));

        let before = a.clone();
        if a.merge(&b, MergePolicy::Fail).is_err() {
            prop_assert_eq!(a.keys().collect::<Vec<_>>(), before.keys().collect::<Vec<_>>());
        }
        assert_manifest_matches(&a)?;

        a.merge(&b, MergePolicy::Update).unwrap();
        assert_manifest_matches(&a)?;
        for key in b.keys().skip(1) {
            prop_assert!(a.contains(key.record_type, key.idc));
        }
    }
}

#[test]
fn manifest_survives_serialization() {
    let mut file = NistFile::new();
    file.add(14, 3, [(3, "0")]).unwrap();
    file.add(2, 0, [(4, "20240101")]).unwrap();
    file.add(9, 3, [(3, "4")]).unwrap();
    file.remove(14, 3).unwrap();

    let options = nistcodec::CodecOptions::new().with_config(
        nistcodec::CodecConfig::for_testing().with_image_geometry_check(false),
    );
    let bytes = nistcodec::serialize(&file, &options, nistcodec::OverrideRegistry::builtin()).unwrap();
    let parsed = NistFile::parse(&bytes).unwrap();
    assert_eq!(
        parsed.manifest().entries(),
        &[RecordKey::new(2, 0), RecordKey::new(9, 3)]
    );
    assert_eq!(parsed.header().field(3), file.header().field(3));
}
