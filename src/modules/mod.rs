// Module exports for pure logic
pub mod comparators;  // Tab record comparators
pub mod sort_spec;    // Sort-spec registry
pub mod diff;         // LCS edit script
pub mod reorder;      // Minimal-move reordering engine
pub mod tabs;         // Sorting passes
pub mod auto_sort;    // Event-driven auto-sort
