//! Engine configuration knobs, equivalent to BuDDy's post-`bdd_init` setters
//! (`bdd_setmaxincrease`, `bdd_setcacheratio`, `bdd_setminfreenodes`, ...).

/// Configuration used to build a [`crate::Manager`], and reapplied live via the
/// corresponding `Manager::set_*` methods.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Initial size of the node table.
    pub node_num: usize,
    /// Initial size of each operation cache.
    pub cache_size: usize,
    /// Maximum number of nodes the table may grow by in one resize. `0` means unlimited.
    pub max_increase: usize,
    /// Hard cap on the total number of nodes. `0` means unlimited.
    pub max_node_num: usize,
    /// Percentage (0-100) of nodes that must be free after a GC, else the table grows.
    pub min_free_nodes: u8,
    /// Cache size is `node_num / cache_ratio` when `cache_ratio > 0`; a fixed
    /// `cache_size` is used otherwise.
    pub cache_ratio: usize,
    /// When true, `delref` on a node with a zero external refcount is an error
    /// rather than a silent no-op (BuDDy's commented-out strict check, made real).
    pub strict_delref: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            node_num: 1000,
            cache_size: 1000,
            max_increase: 50_000,
            max_node_num: 0,
            min_free_nodes: 20,
            cache_ratio: 0,
            strict_delref: true,
        }
    }
}

impl ManagerConfig {
    pub fn with_node_num(mut self, node_num: usize) -> Self {
        self.node_num = node_num;
        self
    }

    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    pub fn with_max_increase(mut self, max_increase: usize) -> Self {
        self.max_increase = max_increase;
        self
    }

    pub fn with_max_node_num(mut self, max_node_num: usize) -> Self {
        self.max_node_num = max_node_num;
        self
    }

    pub fn with_min_free_nodes(mut self, percent: u8) -> Self {
        self.min_free_nodes = percent.min(100);
        self
    }

    pub fn with_cache_ratio(mut self, ratio: usize) -> Self {
        self.cache_ratio = ratio;
        self
    }

    pub fn with_strict_delref(mut self, strict: bool) -> Self {
        self.strict_delref = strict;
        self
    }
}
