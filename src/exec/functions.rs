// Builtin Function Registry
//
// Aggregate functions known to the SQL compiler and the query builder are
// looked up here. The registry is populated once during engine
// initialization; `init::initialize` forces it while the loader-flag mask
// grants global symbol visibility to freshly registered modules.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::sql::relalg::AggFunc;

static AGGREGATES: Lazy<HashMap<&'static str, AggFunc>> = Lazy::new(|| {
    let mut registry = HashMap::new();
    registry.insert("count", AggFunc::Count);
    registry.insert("sum", AggFunc::Sum);
    registry.insert("min", AggFunc::Min);
    registry.insert("max", AggFunc::Max);
    registry.insert("avg", AggFunc::Avg);
    registry
});

/// Look up an aggregate function by its lower-cased SQL name.
pub fn lookup_aggregate(name: &str) -> Option<AggFunc> {
    AGGREGATES.get(name.to_ascii_lowercase().as_str()).copied()
}

/// Number of registered builtin functions.
pub fn registry_size() -> usize {
    AGGREGATES.len()
}
