use phf::{Set, phf_set};

/// Amino-acid backbone atoms that trace the chain.
pub static AA_MIN_BACKBONE_NAMES: Set<&'static str> = phf_set! { "C", "CA", "N" };

/// Amino-acid backbone atoms including the carbonyl oxygen, terminal oxygens and
/// backbone hydrogens.
pub static AA_MAX_BACKBONE_NAMES: Set<&'static str> = phf_set! {
    "C", "CA", "N", "O", "OXT", "OT1", "OT2", "H", "HN", "HA", "H1", "H2", "H3",
};

/// Amino-acid atoms hidden when a ribbon is drawn through the residue.
pub static AA_RIBBON_BACKBONE_NAMES: Set<&'static str> = phf_set! {
    "C", "CA", "N", "O", "OXT", "OT1", "OT2",
};

/// Nucleotide atoms that trace the sugar-phosphate chain.
pub static NA_MIN_BACKBONE_NAMES: Set<&'static str> = phf_set! {
    "P", "O5'", "C5'", "C4'", "C3'", "O3'",
};

/// Nucleotide backbone atoms including phosphate oxygens and the full ribose.
pub static NA_MAX_BACKBONE_NAMES: Set<&'static str> = phf_set! {
    "P", "OP1", "O1P", "OP2", "O2P", "OP3", "O3P", "O5'", "C5'", "C4'", "C3'", "O3'",
    "C2'", "O2'", "C1'", "O4'",
};

/// Nucleotide atoms hidden when a ribbon is drawn through the residue.
pub static NA_RIBBON_BACKBONE_NAMES: Set<&'static str> = phf_set! {
    "P", "OP1", "O1P", "OP2", "O2P", "OP3", "O3P", "O5'", "C5'", "C4'", "C3'", "O3'",
};

pub static RIBOSE_NAMES: Set<&'static str> = phf_set! {
    "C1'", "C2'", "C3'", "C4'", "O4'", "O2'", "O3'", "C5'", "O5'",
};

/// Atom that stands for an amino-acid residue.
pub const AMINO_PRINCIPAL_ATOM: &str = "CA";

/// Atom that stands for a nucleotide residue.
pub const NUCLEIC_PRINCIPAL_ATOM: &str = "C4'";

pub fn is_amino_backbone_atom(atom_name: &str) -> bool {
    AA_MAX_BACKBONE_NAMES.contains(atom_name.trim())
}

pub fn is_nucleic_backbone_atom(atom_name: &str) -> bool {
    NA_MAX_BACKBONE_NAMES.contains(atom_name.trim())
}
