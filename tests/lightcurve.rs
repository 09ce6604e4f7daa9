mod common;

use std::io::Write;

use anyhow::Result;
use approx::assert_relative_eq;
use proptest::prelude::*;

use lcanalyzer::{
    calc_stats, load_dataset, max_mag, mean_mag, min_mag, normalize_lc, split_bands, split_by,
    BandTables, Column, ColumnKind, LcError, Number, Table,
};

use common::{init_logging, variable_star, write_lightcurve, BANDS};

// ---------------------------------------------------------------------------
// Loading and per-band statistics on a file
// ---------------------------------------------------------------------------

#[test]
fn loads_fixture_with_inferred_kinds() -> Result<()> {
    init_logging();
    let rows = variable_star(40, 7);
    let (_dir, path) = write_lightcurve(&rows)?;

    let lc = load_dataset(&path)?;
    assert_eq!(lc.len(), rows.len());
    assert_eq!(lc.column_names(), vec!["objectId", "mjd", "band", "psfMag"]);
    assert_eq!(lc.column("objectId")?.kind(), ColumnKind::Integer);
    assert_eq!(lc.column("mjd")?.kind(), ColumnKind::Float);
    assert_eq!(lc.column("band")?.kind(), ColumnKind::Text);
    assert_eq!(lc.column("psfMag")?.kind(), ColumnKind::Float);
    Ok(())
}

#[test]
fn per_band_stats_match_the_written_values() -> Result<()> {
    init_logging();
    let rows = variable_star(25, 11);
    let (_dir, path) = write_lightcurve(&rows)?;

    let lc = load_dataset(&path)?;
    let per_band = split_bands(&lc, "band", &BANDS)?;
    let stats = calc_stats(&per_band, &BANDS, "psfMag")?;

    assert_eq!(stats.bands().collect::<Vec<_>>(), BANDS.to_vec());
    for band in BANDS {
        let mags: Vec<f64> = rows.iter().filter(|r| r.band == band).map(|r| r.psf_mag).collect();
        let expected_min = mags.iter().copied().fold(f64::INFINITY, f64::min);
        let expected_max = mags.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let expected_mean = mags.iter().sum::<f64>() / mags.len() as f64;

        let s = stats.get(band).expect("band present");
        assert_eq!(s.min, expected_min);
        assert_eq!(s.max, expected_max);
        assert_relative_eq!(s.mean, expected_mean, max_relative = 1e-12);
    }
    Ok(())
}

#[test]
fn split_by_agrees_with_requested_bands() -> Result<()> {
    let (_dir, path) = write_lightcurve(&variable_star(10, 3))?;
    let lc = load_dataset(&path)?;

    let discovered = split_by(&lc, "band")?;
    let requested = split_bands(&lc, "band", &BANDS)?;
    assert_eq!(discovered, requested);
    Ok(())
}

#[test]
fn normalized_bands_span_unit_interval() -> Result<()> {
    let (_dir, path) = write_lightcurve(&variable_star(30, 5))?;
    let lc = load_dataset(&path)?;

    for (band, table) in split_by(&lc, "band")? {
        let norm = normalize_lc(&table, "psfMag")?;
        assert_eq!(norm.len(), table.len(), "band {band}");
        assert!(norm.iter().all(|x| (0.0..=1.0).contains(x)), "band {band}");
        assert!(norm.contains(&0.0));
        assert!(norm.contains(&1.0));
    }
    Ok(())
}

#[test]
fn missing_band_is_reported() {
    let lc = BandTables::from([(
        "g".to_string(),
        Table::new(vec![Column::float("psfMag", vec![18.0, 18.5])]).unwrap(),
    )]);
    let err = calc_stats(&lc, &["g", "r"], "psfMag").unwrap_err();
    assert!(matches!(err, LcError::MissingBand { ref band } if band == "r"));
}

#[test]
fn band_name_column_cannot_be_reduced() -> Result<()> {
    let (_dir, path) = write_lightcurve(&variable_star(5, 1))?;
    let lc = load_dataset(&path)?;
    let err = max_mag(&lc, "band").unwrap_err();
    assert!(matches!(err, LcError::InvalidOperandKind { kind: ColumnKind::Text, .. }));
    Ok(())
}

#[test]
fn ragged_file_is_a_parse_error() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "mjd,band,psfMag")?;
    writeln!(file, "59000.1,g,18.2")?;
    writeln!(file, "59000.2,r")?;
    file.flush()?;

    let err = load_dataset(file.path()).unwrap_err();
    assert!(matches!(err, LcError::Parse { line: Some(3), .. }), "{err}");
    Ok(())
}

#[test]
fn missing_file_is_a_file_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let err = load_dataset(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, LcError::File { .. }));
    Ok(())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn single_column(values: Vec<f64>) -> Table {
    Table::new(vec![Column::float("m", values)]).unwrap()
}

proptest! {
    #[test]
    fn mean_lies_between_min_and_max(values in prop::collection::vec(-40.0f64..40.0, 1..64)) {
        let t = single_column(values);
        let min = min_mag(&t, "m").unwrap().as_f64();
        let max = max_mag(&t, "m").unwrap().as_f64();
        let mean = mean_mag(&t, "m").unwrap();
        prop_assert!(min <= mean && mean <= max, "{min} <= {mean} <= {max}");
    }

    #[test]
    fn extrema_ignore_row_order(
        (values, shuffled) in prop::collection::vec(-1000i64..1000, 1..64)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        let a = Table::new(vec![Column::integer("m", values)]).unwrap();
        let b = Table::new(vec![Column::integer("m", shuffled)]).unwrap();
        prop_assert_eq!(min_mag(&a, "m").unwrap(), min_mag(&b, "m").unwrap());
        prop_assert_eq!(max_mag(&a, "m").unwrap(), max_mag(&b, "m").unwrap());
    }

    #[test]
    fn constant_column_mean_and_normalization(v in -30.0f64..30.0, n in 1usize..32) {
        let t = single_column(vec![v; n]);
        prop_assert_eq!(mean_mag(&t, "m").unwrap(), v);
        prop_assert_eq!(normalize_lc(&t, "m").unwrap(), vec![0.0; n]);
    }

    #[test]
    fn integer_extrema_stay_integers(values in prop::collection::vec(any::<i32>(), 1..32)) {
        let t = Table::new(vec![Column::integer("m", values.iter().map(|&v| v as i64).collect())]).unwrap();
        prop_assert!(matches!(min_mag(&t, "m").unwrap(), Number::Integer(_)));
        prop_assert!(matches!(max_mag(&t, "m").unwrap(), Number::Integer(_)));
    }
}
