//! Prim flags and traversal predicates.

/// Composed state of a prim, used to filter traversals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrimFlags {
    /// The prim and all its ancestors are active
    pub active: bool,

    /// Payloads are not supported, so every prim is loaded
    pub loaded: bool,

    /// Composed specifier is `def` or `class`, and so is every ancestor's
    pub defined: bool,

    /// The prim or an ancestor is a `class`
    pub is_abstract: bool,

    /// `instanceable = true` with a composition arc
    pub instance: bool,

    /// Seen through an instance ancestor
    pub instance_proxy: bool,
}

impl PrimFlags {
    /// Flags of the pseudo-root.
    pub fn root() -> Self {
        Self {
            active: true,
            loaded: true,
            defined: true,
            is_abstract: false,
            instance: false,
            instance_proxy: false,
        }
    }
}

/// Which prims a traversal yields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrimPredicate {
    require_active: bool,
    require_loaded: bool,
    require_defined: bool,
    exclude_abstract: bool,
    traverse_instance_proxies: bool,
}

impl Default for PrimPredicate {
    fn default() -> Self {
        Self::default_predicate()
    }
}

impl PrimPredicate {
    /// Active, loaded, defined, non-abstract prims.
    pub fn default_predicate() -> Self {
        Self {
            require_active: true,
            require_loaded: true,
            require_defined: true,
            exclude_abstract: true,
            traverse_instance_proxies: false,
        }
    }

    /// Every prim, including inactive, undefined and abstract ones.
    pub fn all_prims() -> Self {
        Self {
            require_active: false,
            require_loaded: false,
            require_defined: false,
            exclude_abstract: false,
            traverse_instance_proxies: false,
        }
    }

    /// Also yield instance proxies beneath instances.
    pub fn traverse_instance_proxies(mut self) -> Self {
        self.traverse_instance_proxies = true;
        self
    }

    pub fn traverses_instance_proxies(&self) -> bool {
        self.traverse_instance_proxies
    }

    pub fn accepts(&self, flags: &PrimFlags) -> bool {
        (!self.require_active || flags.active)
            && (!self.require_loaded || flags.loaded)
            && (!self.require_defined || flags.defined)
            && (!self.exclude_abstract || !flags.is_abstract)
            && (self.traverse_instance_proxies || !flags.instance_proxy)
    }
}
