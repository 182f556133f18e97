//! Minutiae, cores and deltas through whole-file serialization.

use crate::common::*;
use nist_fingerprint::{
    check_minutiae, AnnotationKind, AnnotationList, ColumnValue, Compression, FormatSpec,
    QualityMap,
};
use nistcodec::NistFile;
use proptest::prelude::*;

fn minutia_row() -> impl Strategy<Value = (u32, u32, i64, i64, char)> {
    (0u32..10_000, 0u32..10_000, 0i64..360, 0i64..100, prop::char::range('A', 'E'))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn minutiae_survive_the_wire(rows in prop::collection::vec(minutia_row(), 0..20)) {
        let spec = FormatSpec::parse("ixytqd").unwrap();
        let rows: Vec<Vec<ColumnValue>> = rows
            .iter()
            .enumerate()
            .map(|(n, (x, y, t, q, d))| {
                vec![
                    ColumnValue::Int(n as i64 + 1),
                    ColumnValue::Float(*x as f64 / 100.0),
                    ColumnValue::Float(*y as f64 / 100.0),
                    ColumnValue::Int(*t),
                    ColumnValue::Int(*q),
                    ColumnValue::Text(d.to_string()),
                ]
            })
            .collect();
        let list = AnnotationList::from_list(&rows, &spec, AnnotationKind::Minutia).unwrap();

        let mut file = NistFile::new();
        let record = file.add(9, 2, [(3, "4"), (4, "S")]).unwrap();
        prop_assert_eq!(nist_fingerprint::set_minutiae(record, &list).unwrap(), rows.len());

        let parsed = NistFile::parse(&file.serialize().unwrap()).unwrap();
        let record = parsed.get(9, 2).unwrap();
        let count = rows.len().to_string();
        prop_assert_eq!(record.text(10), Some(count.as_str()));
        let back = nist_fingerprint::minutiae(record).unwrap();
        prop_assert_eq!(back.to_list(&spec).unwrap(), rows);
    }
}

#[test]
fn cores_and_deltas_survive_the_wire() {
    let deltas = AnnotationList::from_list(
        &[vec![3.25.into(), 9.5.into()], vec![20.0.into(), 0.05.into()]],
        &FormatSpec::parse("xy").unwrap(),
        AnnotationKind::Delta,
    )
    .unwrap();

    let mut file = latent_file();
    nist_fingerprint::set_deltas(file.get_mut(9, 0).unwrap(), &deltas).unwrap();
    let parsed = NistFile::parse(&file.serialize().unwrap()).unwrap();
    let record = parsed.get_single(9).unwrap();

    assert_eq!(record.text(8), Some("12501870"));
    let xy = FormatSpec::parse("xy").unwrap();
    assert_eq!(
        nist_fingerprint::cores(record).unwrap().to_list(&xy).unwrap(),
        reference_core().to_list(&xy).unwrap()
    );
    assert_eq!(
        nist_fingerprint::deltas(record).unwrap().to_list(&xy).unwrap(),
        deltas.to_list(&xy).unwrap()
    );
}

#[test]
fn check_minutiae_drops_points_outside_the_image() {
    init_tracing();
    let mut file = latent_file();
    // 500 px at 500 ppi: the image is 25.4 mm square
    assert_eq!(check_minutiae(&mut file, 0).unwrap(), 0);

    let mut rows = minutiae_rows(&REFERENCE_MINUTIAE);
    rows.push(vec![11i64.into(), 30.0.into(), 10.0.into(), 90i64.into(), 0i64.into(), "A".into()]);
    rows.insert(0, vec![0i64.into(), 1.0.into(), 26.0.into(), 45i64.into(), 0i64.into(), "B".into()]);
    let spec = FormatSpec::parse("ixytqd").unwrap();
    let list = AnnotationList::from_list(&rows, &spec, AnnotationKind::Minutia).unwrap();
    nist_fingerprint::set_minutiae(file.get_mut(9, 0).unwrap(), &list).unwrap();

    assert_eq!(check_minutiae(&mut file, 0).unwrap(), 2);
    let record = file.get(9, 0).unwrap();
    assert_eq!(record.text(10), Some("10"));
    assert_eq!(
        nist_fingerprint::minutiae(record).unwrap().to_list(&spec).unwrap(),
        reference_minutiae().to_list(&spec).unwrap()
    );
    assert_eq!(file.serialize().unwrap(), latent_file().serialize().unwrap());
}

#[test]
fn check_minutiae_needs_an_image() {
    let mut file = latent_file();
    file.remove(13, 0).unwrap();
    let err = check_minutiae(&mut file, 0).unwrap_err();
    assert!(matches!(err, nistcodec::NistError::RecordNotFound { .. }));
}

#[test]
fn geometry_helpers_on_parsed_minutiae() {
    let parsed = NistFile::parse(&latent_file().serialize().unwrap()).unwrap();
    let minutiae = nist_fingerprint::minutiae(parsed.get_single(9).unwrap()).unwrap();
    let core = (12.5, 18.7);

    let closest = minutiae.n_closest(2, core);
    let indices: Vec<Option<&ColumnValue>> = closest.iter().map(|m| m.get('i')).collect();
    assert_eq!(indices, vec![Some(&ColumnValue::Int(6)), Some(&ColumnValue::Int(2))]);

    let furthest = minutiae.n_furthest(1, core);
    assert_eq!(furthest.get(0).unwrap().get('i'), Some(&ColumnValue::Int(8)));

    assert_eq!(minutiae.get_by_type("A").len(), 10);
    assert!(minutiae.get_by_type("B").is_empty());
}

#[test]
fn pairing_and_local_quality_survive_the_wire() {
    let mut file = latent_file();
    let record = file.get_mut(9, 0).unwrap();
    let pairs = AnnotationList::from_list(
        &[vec![2i64.into(), "1".into()], vec![6i64.into(), "2".into()]],
        &FormatSpec::parse("in").unwrap(),
        AnnotationKind::Pairing,
    )
    .unwrap();
    assert_eq!(nist_fingerprint::set_pairing(record, &pairs).unwrap(), 2);
    // 2.54 mm cells over the 25.4 mm image: good left half, poor right half
    let rows = vec![vec![4, 4, 4, 4, 4, 1, 1, 1, 1, 1]; 10];
    let map = QualityMap::new(254, rows).unwrap();
    nist_fingerprint::set_quality_map(record, &map, Compression::Rle).unwrap();

    let parsed = NistFile::parse(&file.serialize().unwrap()).unwrap();
    let record = parsed.get(9, 0).unwrap();
    assert_eq!(nist_fingerprint::paired_count(record).unwrap(), 2);
    let named = nist_fingerprint::minutiae_by_pairing_name(record, &["2"]).unwrap();
    assert_eq!(named.get(0).unwrap().get('i'), Some(&ColumnValue::Int(6)));
    assert_eq!(nist_fingerprint::quality_map(record).unwrap(), Some(map));

    let good = nist_fingerprint::minutiae_by_quality(&parsed, 0, 3, true).unwrap();
    let indices: Vec<ColumnValue> = good.iter().map(|m| m.value('i').unwrap()).collect();
    assert_eq!(indices, [1, 3, 5, 6, 8].map(ColumnValue::Int).to_vec());
}
