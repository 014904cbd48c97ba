use slotmap::new_key_type;

new_key_type! {
    pub struct AtomId;
    pub struct BondId;
    pub struct ResidueId;
    pub struct ChainId;
    pub struct CoordSetId;
    pub struct PbGroupId;
    pub struct PseudobondId;
}
