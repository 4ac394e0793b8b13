use typed_builder::TypedBuilder;

/// Which index list a mapping is recorded in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexMode {
    /// One list per user id, at `user:{userId}:mappings:list`.
    #[default]
    PerUser,
    /// A single list for every mapping, at `mappings:list`.
    Global,
}

#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct RegistryConfig {
    #[builder(default)]
    pub index_mode: IndexMode,
}
