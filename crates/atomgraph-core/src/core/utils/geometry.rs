use nalgebra::Point3;

/// Signed dihedral angle a-b-c-d in degrees, in [-180, 180].
///
/// Returns `None` when three consecutive points are collinear and the angle is
/// undefined.
pub fn dihedral_angle(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> Option<f64> {
    let b1 = b - a;
    let b2 = c - b;
    let b3 = d - c;

    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    if n1.norm() < 1e-9 || n2.norm() < 1e-9 {
        return None;
    }

    let m1 = n1.cross(&b2.normalize());
    let x = n1.dot(&n2);
    let y = m1.dot(&n2);
    Some(-y.atan2(x).to_degrees())
}

/// Smallest absolute difference between two angles in degrees.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn trans_configuration_is_180_degrees() {
        let angle = dihedral_angle(
            &Point3::new(1.0, 1.0, 0.0),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, -1.0, 0.0),
        )
        .unwrap();
        assert!(f64_approx_equal(angle.abs(), 180.0));
    }

    #[test]
    fn cis_configuration_is_zero_degrees() {
        let angle = dihedral_angle(
            &Point3::new(0.0, 1.0, 0.0),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(1.0, 1.0, 0.0),
        )
        .unwrap();
        assert!(f64_approx_equal(angle, 0.0));
    }

    #[test]
    fn sign_follows_iupac_convention() {
        let angle = dihedral_angle(
            &Point3::new(0.0, 1.0, 0.0),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 1.0),
        )
        .unwrap();
        assert!(f64_approx_equal(angle, 90.0));
    }

    #[test]
    fn collinear_points_have_no_dihedral() {
        let p = |x: f64| Point3::new(x, 0.0, 0.0);
        assert!(dihedral_angle(&p(0.0), &p(1.0), &p(2.0), &Point3::new(3.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn angle_difference_wraps_around() {
        assert!(f64_approx_equal(angle_difference(170.0, -170.0), 20.0));
        assert!(f64_approx_equal(angle_difference(-57.0, -47.0), 10.0));
    }
}
