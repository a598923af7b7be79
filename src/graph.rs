//! Graph state: the list of plotted expressions, the sliders bound to
//! their free parameters, and the animation clock that drives the `t`
//! slider.
//!
//! The store owns reconciliation: after every mutation it recomputes the
//! union of free variables across visible expressions and adds or removes
//! sliders to match.
//! ```
//! use equano::graph::store::GraphStore;
//!
//! let mut store = GraphStore::new();
//! let (added, _removed) = store.add_expression("y = a*x + b");
//! assert_eq!(added, vec!["a".to_string(), "b".to_string()]);
//! let scope = store.scope();
//! assert_eq!(scope["a"], 1.0);
//! ```
pub mod animation;
pub mod store;
