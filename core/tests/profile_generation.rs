mod common;

use approx::assert_relative_eq;
use common::{nominal_time, Synthetic};
use vvpcore::profile::WindStatus;
use vvpcore::{generate, FieldSet, ProfileConfig, ProfileError, ProfileField, ProfileGenerator, Variant};

fn config(variant: Variant) -> ProfileConfig {
    ProfileConfig {
        hmax: 2_000,
        ..ProfileConfig::default().with_variant(variant)
    }
}

fn values(profile: &vvpcore::VerticalProfile, field: ProfileField) -> Vec<f64> {
    profile.values(field).unwrap().to_vec()
}

#[test]
fn sweeps_below_emin_give_no_usable_data() {
    let volume = Synthetic {
        elevations: vec![0.5, 1.5],
        ..Synthetic::default()
    }
    .build();
    let result = generate(&volume, &config(Variant::Enhanced));
    assert_eq!(result.unwrap_err(), ProfileError::NoUsableData);
}

#[test]
fn every_field_has_one_value_per_layer() {
    let volume = Synthetic::default().build();
    let cfg = ProfileConfig {
        dz: 250,
        ..config(Variant::Enhanced)
    };
    let profile = generate(&volume, &cfg).unwrap();
    assert_eq!(profile.level_count(), 8);
    assert_eq!(profile.fields.len(), 10);
    assert!(profile.fields.iter().all(|f| f.values.len() == 8));

    let heights = values(&profile, ProfileField::Hght);
    for (i, h) in heights.iter().enumerate() {
        assert_relative_eq!(*h, (i as f64 + 0.5) * 0.25, epsilon = 1e-12);
    }
    assert_eq!(profile.field(ProfileField::Nv).unwrap().quantity, "n");
}

#[test]
fn enhanced_recovers_noisy_south_westerly() {
    let volume = Synthetic {
        velocity_noise: 1.0,
        dbz_noise: 2.0,
        ..Synthetic::from_wind(15.0, 225.0)
    }
    .build();
    let profile = generate(&volume, &config(Variant::Enhanced)).unwrap();

    let ff = values(&profile, ProfileField::Ff);
    let dd = values(&profile, ProfileField::Dd);
    let u = values(&profile, ProfileField::Uwnd);
    let v = values(&profile, ProfileField::Vwnd);
    let nv = values(&profile, ProfileField::Nv);
    let nodata = profile.field(ProfileField::Ff).unwrap().scaling.nodata;

    let mut valid = 0;
    for i in 0..profile.level_count() {
        if ff[i] == nodata {
            assert_eq!(nv[i], -1.0);
            continue;
        }
        valid += 1;
        assert!((ff[i] - 15.0).abs() < 0.5, "layer {} ff {}", i, ff[i]);
        assert!((dd[i] - 225.0).abs() < 3.0, "layer {} dd {}", i, dd[i]);
        assert!(u[i] > 0.0 && v[i] > 0.0);
        assert!(nv[i] >= 40.0);
    }
    assert!(valid >= 5);
    assert_eq!(profile.metrics.wind_layers, valid);
}

#[test]
fn legacy_fits_sine_pattern_exactly() {
    let volume = Synthetic::default().build_with(|az, _| Some(10.0 * az.sin() + 5.0 * az.cos() + 1.0));
    let profile = generate(&volume, &config(Variant::Legacy)).unwrap();

    let valid: Vec<_> = profile.levels.iter().filter_map(|l| l.wind).collect();
    assert!(!valid.is_empty());
    for wind in valid {
        assert_relative_eq!(wind.speed, 125f64.sqrt(), epsilon = 1e-6);
        assert_relative_eq!(wind.direction, 270.0 - 5f64.atan2(10.0).to_degrees(), epsilon = 1e-6);
        assert!(wind.std_dev < 1e-6);
    }
}

#[test]
fn layers_without_velocity_report_counts_per_variant() {
    let volume = Synthetic::default().build();

    let enhanced = ProfileConfig {
        vmin: 1_000.0,
        ..config(Variant::Enhanced)
    };
    let profile = generate(&volume, &enhanced).unwrap();
    assert!(values(&profile, ProfileField::Nv).iter().all(|&n| n == -1.0));
    assert!(values(&profile, ProfileField::Ff)
        .iter()
        .all(|&ff| ff == enhanced.nodata_vp));

    let legacy = ProfileConfig {
        vmin: 1_000.0,
        ..config(Variant::Legacy)
    };
    let profile = generate(&volume, &legacy).unwrap();
    assert!(values(&profile, ProfileField::Nv).iter().all(|&n| n == 0.0));
    assert!(profile
        .levels
        .iter()
        .all(|l| l.wind_status == WindStatus::TooFewSamples));
}

#[test]
fn azimuth_gap_blanks_enhanced_wind() {
    let synthetic = Synthetic {
        velocity_noise: 0.5,
        ..Synthetic::default()
    };
    let volume = synthetic.build_with(|az, el| {
        let deg = az.to_degrees();
        (!(90.0..180.0).contains(&deg)).then(|| synthetic.radial(az, el))
    });
    let profile = generate(&volume, &config(Variant::Enhanced)).unwrap();

    assert!(profile.levels.iter().all(|l| l.wind.is_none()));
    assert!(profile.metrics.gap_layers > 0);
    assert_eq!(profile.metrics.wind_layers, 0);
    // reflectivity is unaffected
    assert!(profile.metrics.reflectivity_layers > 0);
}

#[test]
fn sparse_reflectivity_is_nodata() {
    let volume = Synthetic {
        echo_rays: 2,
        ..Synthetic::default()
    }
    .build();
    let cfg = ProfileConfig {
        nmin_ref: 1_000,
        ..config(Variant::Enhanced)
    };
    let profile = generate(&volume, &cfg).unwrap();
    assert!(values(&profile, ProfileField::Dbzh)
        .iter()
        .all(|&z| z == cfg.nodata_vp));
    assert!(values(&profile, ProfileField::Nz).iter().all(|&n| n == -1.0));
}

#[test]
fn constant_reflectivity_has_undetected_spread() {
    let volume = Synthetic {
        dbz: 18.0,
        ..Synthetic::default()
    }
    .build();
    let cfg = ProfileConfig {
        undetect_vp: -8888.0,
        ..config(Variant::Enhanced)
    };
    let profile = generate(&volume, &cfg).unwrap();
    let dbzh = values(&profile, ProfileField::Dbzh);
    let dev = values(&profile, ProfileField::DbzhDev);
    let mut seen = 0;
    for i in 0..profile.level_count() {
        if dbzh[i] != cfg.nodata_vp {
            seen += 1;
            assert_relative_eq!(dbzh[i], 18.0, epsilon = 1e-9);
            assert_eq!(dev[i], -8888.0);
        }
    }
    assert!(seen > 0);
}

#[test]
fn speeds_above_ceiling_are_discarded() {
    let volume = Synthetic::from_wind(40.0, 270.0).build();
    let cfg = ProfileConfig {
        ff_max: 30.0,
        ..config(Variant::Legacy)
    };
    let profile = generate(&volume, &cfg).unwrap();
    assert_eq!(profile.metrics.wind_layers, 0);
    assert!(profile
        .levels
        .iter()
        .any(|l| l.wind_status == WindStatus::Gated));
}

#[test]
fn output_values_are_packed() {
    let volume = Synthetic {
        velocity_noise: 1.0,
        ..Synthetic::default()
    }
    .build();
    let plain_cfg = config(Variant::Enhanced);
    let plain = generate(&volume, &plain_cfg).unwrap();
    let packed_cfg = ProfileConfig {
        gain_vp: 0.5,
        offset_vp: 10.0,
        ..config(Variant::Enhanced)
    };
    let packed = generate(&volume, &packed_cfg).unwrap();

    let raw = values(&plain, ProfileField::Ff);
    let scaled = values(&packed, ProfileField::Ff);
    assert!(plain.metrics.wind_layers > 0);
    for (r, s) in raw.iter().zip(&scaled) {
        if *r == plain_cfg.nodata_vp {
            assert_eq!(*s, packed_cfg.nodata_vp);
            continue;
        }
        assert_relative_eq!(*s, (r - 10.0) / 0.5, epsilon = 1e-9);
    }
    // heights and counts are never packed
    assert_eq!(values(&plain, ProfileField::Hght), values(&packed, ProfileField::Hght));
    assert_eq!(values(&plain, ProfileField::Nv), values(&packed, ProfileField::Nv));
}

#[test]
fn generation_is_deterministic() {
    let volume = Synthetic {
        velocity_noise: 1.5,
        dbz_noise: 3.0,
        ..Synthetic::default()
    }
    .build();
    let generator = ProfileGenerator::new(config(Variant::Enhanced));
    let first = generator.generate(&volume).unwrap();
    let second = generator.generate(&volume).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn metadata_describes_accepted_sweeps() {
    let volume = Synthetic {
        elevations: vec![12.0, 0.5, 3.0, 5.0],
        ..Synthetic::default()
    }
    .build();
    let profile = generate(&volume, &config(Variant::Enhanced)).unwrap();
    let attrs = &profile.attributes;

    assert_eq!(attrs.product, "VP");
    assert_eq!(attrs.source, "NOD:nltst");
    assert_eq!(attrs.angles_attribute(), "3.0,5.0,12.0");
    assert_eq!(attrs.task_attribute().as_deref(), Some("vol_a"));
    assert_eq!(attrs.date_time, nominal_time());
    // sweep 0 starts at +0 s, sweep 3 ends at +115 s
    assert_eq!(attrs.start, nominal_time());
    assert_eq!(attrs.end, nominal_time() + chrono::Duration::seconds(115));
    assert_eq!(attrs.interval, 200);
    assert_eq!(attrs.max_height, 2_000);
    assert_relative_eq!(attrs.min_range_km, 4.0);
    assert_eq!(profile.metrics.sweeps_accepted, 3);
    assert_eq!(profile.metrics.sweeps_rejected, 1);
}

#[test]
fn full_buffers_drop_and_count_samples() {
    let volume = Synthetic::default().build();
    let cfg = ProfileConfig {
        max_samples: 50,
        nmin_wnd: 10,
        nmin_ref: 10,
        ..config(Variant::Legacy)
    }
    .with_fields(FieldSet::parse("NV,NZ").unwrap());
    let profile = generate(&volume, &cfg).unwrap();
    assert!(profile.metrics.velocity_dropped > 0);
    assert!(profile.metrics.reflectivity_dropped > 0);
    assert!(profile.levels.iter().all(|l| l.nv <= 50 && l.nz <= 50));
    assert_eq!(profile.fields.len(), 2);
}

#[test]
fn legacy_gated_layers_report_negative_counts() {
    let volume = Synthetic::default().build_with(|az, _| Some(10.0 * az.sin() + 5.0 * az.cos() + 1.0));
    let cfg = ProfileConfig {
        nmin: 1_000_000,
        nmin_wnd: 1_000_000,
        ..config(Variant::Legacy)
    };
    let profile = generate(&volume, &cfg).unwrap();
    let nv = values(&profile, ProfileField::Nv);
    let nz = values(&profile, ProfileField::Nz);
    let ff = values(&profile, ProfileField::Ff);
    let dbzh = values(&profile, ProfileField::Dbzh);

    assert!(profile.levels.iter().any(|l| l.wind_status == WindStatus::Gated));
    assert!(profile.levels.iter().any(|l| l.nz > 0));
    for (i, level) in profile.levels.iter().enumerate() {
        assert_eq!(ff[i], cfg.nodata_vp);
        assert_eq!(dbzh[i], cfg.nodata_vp);
        let expected_nv = if level.wind_status == WindStatus::Gated { -1.0 } else { 0.0 };
        assert_eq!(nv[i], expected_nv);
        let expected_nz = if level.nz > 0 { -1.0 } else { 0.0 };
        assert_eq!(nz[i], expected_nz);
    }
}

#[test]
fn legacy_wind_floor_above_combined_floor_keeps_reflectivity() {
    let volume = Synthetic::default().build_with(|az, _| Some(10.0 * az.sin() + 5.0 * az.cos() + 1.0));
    let cfg = ProfileConfig {
        nmin_wnd: 1_000_000,
        ..config(Variant::Legacy)
    };
    assert_eq!(cfg.nmin, 36);
    let profile = generate(&volume, &cfg).unwrap();
    let nv = values(&profile, ProfileField::Nv);
    let nz = values(&profile, ProfileField::Nz);
    let ff = values(&profile, ProfileField::Ff);
    let dbzh = values(&profile, ProfileField::Dbzh);

    assert_eq!(profile.metrics.wind_layers, 0);
    let mut reflectivity_layers = 0;
    for (i, level) in profile.levels.iter().enumerate() {
        assert!(level.wind.is_none());
        assert_eq!(ff[i], cfg.nodata_vp);
        if level.wind_status == WindStatus::Gated {
            assert_eq!(nv[i], -1.0);
        }
        if level.nv >= cfg.nmin && level.nz >= cfg.nmin {
            reflectivity_layers += 1;
            assert_eq!(level.wind_status, WindStatus::Gated);
            assert!(level.reflectivity.is_some());
            assert_relative_eq!(dbzh[i], 25.0, epsilon = 1e-9);
            assert_eq!(nz[i], level.nz as f64);
        }
    }
    assert!(reflectivity_layers > 0);
}
