use anchortarget::lowlevel::{decode_shortest_delta, signed_shortest_delta, symmetric_distance};
use anchortarget::AnchorTargetError;

/// Angles covering `(-90, 90]` on a 0.75 degree grid plus the wrap neighbourhood.
fn canonical_angles() -> Vec<f64> {
    let mut out: Vec<f64> = (1..=240).map(|i| -90.0 + 0.75 * i as f64).collect();
    out.extend([-89.9999, -45.0001, 0.0001, 89.9999, 90.0]);
    out
}

#[test]
fn decode_round_trips_every_pair() {
    let angles = canonical_angles();
    for &anchor in &angles {
        for &target in &angles {
            let encoded = signed_shortest_delta(target, anchor).unwrap();
            assert!((-2.0..=2.0).contains(&encoded));
            let decoded = decode_shortest_delta(anchor, encoded).unwrap();
            assert!(decoded > -90.0 && decoded <= 90.0);
            assert!(
                symmetric_distance(decoded, target) < 1e-4,
                "anchor {anchor} target {target} decoded {decoded}"
            );
        }
    }
}

#[test]
fn symmetric_distance_properties_hold_on_the_grid() {
    let angles = canonical_angles();
    for &a in &angles {
        assert!(symmetric_distance(a, a).abs() < 1e-6);
        for &b in &angles {
            let d = symmetric_distance(a, b);
            assert!((0.0..=90.0).contains(&d));
            assert!((d - symmetric_distance(b, a)).abs() < 1e-9);
        }
    }
    assert!((symmetric_distance(89.0, -89.0) - 2.0).abs() < 1e-6);
}

#[test]
fn distance_grows_continuously_through_the_wrap() {
    let mut previous = symmetric_distance(80.0, 80.0);
    let mut theta = 80.0;
    // Walk 80 -> 90 -> -80 in 0.5 degree steps.
    for _ in 0..40 {
        theta += 0.5;
        let wrapped = if theta > 90.0 { theta - 180.0 } else { theta };
        let d = symmetric_distance(80.0, wrapped);
        assert!((d - previous - 0.5).abs() < 1e-6, "jump at {wrapped}");
        previous = d;
    }
}

#[test]
fn out_of_range_inputs_fail_with_domain_errors() {
    assert_eq!(
        signed_shortest_delta(-95.0, 0.0),
        Err(AnchorTargetError::Domain { angle_deg: -95.0 })
    );
    assert!(signed_shortest_delta(f64::NAN, 0.0).is_err());
    assert_eq!(
        decode_shortest_delta(180.0, 0.1),
        Err(AnchorTargetError::Domain { angle_deg: 180.0 })
    );
}
