//! Small structures shared by unit tests across the crate.

use super::atom::Element;
use super::ids::{AtomId, ResidueId};
use super::structure::Structure;
use nalgebra::Point3;

/// A single residue holding a six-carbon ring, atoms in ring order.
pub(crate) fn benzene() -> (Structure, Vec<AtomId>) {
    let mut structure = Structure::new("benzene");
    let residue = structure.add_residue("BNZ", "A", 1, ' ').unwrap();
    let atoms: Vec<AtomId> = (1..=6)
        .map(|i| {
            structure
                .add_atom(residue, &format!("C{i}"), Element::C)
                .unwrap()
        })
        .collect();
    for i in 0..6 {
        structure.add_bond(atoms[i], atoms[(i + 1) % 6]).unwrap();
    }
    (structure, atoms)
}

/// Adds an amino-acid residue with N, CA, C, O bonded along the backbone.
pub(crate) fn add_amino_residue(
    structure: &mut Structure,
    name: &str,
    chain_id: &str,
    number: i32,
) -> ResidueId {
    let residue = structure.add_residue(name, chain_id, number, ' ').unwrap();
    let n = structure.add_atom(residue, "N", Element::N).unwrap();
    let ca = structure.add_atom(residue, "CA", Element::C).unwrap();
    let c = structure.add_atom(residue, "C", Element::C).unwrap();
    let o = structure.add_atom(residue, "O", Element::O).unwrap();
    structure.add_bond(n, ca).unwrap();
    structure.add_bond(ca, c).unwrap();
    structure.add_bond(c, o).unwrap();
    residue
}

/// Joins `upstream` C to `downstream` N with a peptide bond.
pub(crate) fn link_peptide(structure: &mut Structure, upstream: ResidueId, downstream: ResidueId) {
    let c = structure.residue(upstream).unwrap().find_atom("C").unwrap();
    let n = structure.residue(downstream).unwrap().find_atom("N").unwrap();
    structure.add_bond(c, n).unwrap();
}

/// An `n`-residue alanine chain "A" with peptide bonds between neighbors.
pub(crate) fn peptide(n: usize) -> (Structure, Vec<ResidueId>) {
    let mut structure = Structure::new("peptide");
    let residues: Vec<ResidueId> = (0..n)
        .map(|i| add_amino_residue(&mut structure, "ALA", "A", i as i32 + 1))
        .collect();
    for pair in residues.windows(2) {
        link_peptide(&mut structure, pair[0], pair[1]);
    }
    (structure, residues)
}

/// An `n`-residue chain whose backbone coordinates follow ideal (phi, psi) angles,
/// built in a fresh active coordinate set.
pub(crate) fn peptide_with_torsions(n: usize, phi: f64, psi: f64) -> (Structure, Vec<ResidueId>) {
    let (mut structure, residues) = peptide(n);
    let cs = structure.add_coord_set(1).unwrap();

    const N_CA: f64 = 1.458;
    const CA_C: f64 = 1.525;
    const C_N: f64 = 1.329;
    const C_O: f64 = 1.231;
    const ANGLE_N_CA_C: f64 = 111.2;
    const ANGLE_CA_C_N: f64 = 116.2;
    const ANGLE_C_N_CA: f64 = 121.7;
    const OMEGA: f64 = 180.0;

    let mut trace = vec![
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(N_CA, 0.0, 0.0),
    ];
    // trace[0] is a dummy anchor; backbone atoms start at index 1.
    let mut backbone = Vec::new();
    for (i, &residue) in residues.iter().enumerate() {
        let r = structure.residue(residue).unwrap();
        let ids = ["N", "CA", "C", "O"].map(|name| r.find_atom(name).unwrap());

        if i > 0 {
            let n_pos = place(&trace, C_N, ANGLE_CA_C_N, psi);
            trace.push(n_pos);
            let ca_pos = place(&trace, N_CA, ANGLE_C_N_CA, OMEGA);
            trace.push(ca_pos);
        }
        let c_pos = place(&trace, CA_C, ANGLE_N_CA_C, phi);
        trace.push(c_pos);

        let len = trace.len();
        let (n_pos, ca_pos, c_pos) = (trace[len - 3], trace[len - 2], trace[len - 1]);
        let o_pos = place(&[n_pos, ca_pos, c_pos], C_O, 120.5, psi + 180.0);
        backbone.push((ids, [n_pos, ca_pos, c_pos, o_pos]));
    }

    for (ids, positions) in backbone {
        for (id, pos) in ids.into_iter().zip(positions) {
            structure.set_coord(id, cs, pos).unwrap();
        }
    }
    (structure, residues)
}

/// Places a point after the last three of `chain` with the given bond length,
/// bond angle and dihedral (degrees).
fn place(chain: &[Point3<f64>], length: f64, angle: f64, torsion: f64) -> Point3<f64> {
    let n = chain.len();
    let (a, b, c) = (chain[n - 3], chain[n - 2], chain[n - 1]);
    let bc = (c - b).normalize();
    let normal = (b - a).cross(&bc).normalize();
    let m = normal.cross(&bc);

    let angle = angle.to_radians();
    let torsion = torsion.to_radians();
    let d2 = nalgebra::Vector3::new(
        -length * angle.cos(),
        length * angle.sin() * torsion.cos(),
        length * angle.sin() * torsion.sin(),
    );
    c + bc * d2.x + m * d2.y + normal * d2.z
}
