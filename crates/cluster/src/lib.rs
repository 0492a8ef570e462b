//! # Clone clustering
//!
//! Turns a collection of MinHash sketches into similarity groups:
//!
//! 1.  **Distance matrix**: every pair of sketches is compared and the
//!     estimated Jaccard similarity is mapped to a distance,
//!     `(1 - similarity) * text_weight`. Rows are computed on the rayon pool
//!     when enabled; the result does not depend on scheduling.
//! 2.  **Density scan**: a DBSCAN-style pass over the precomputed matrix.
//!     Documents no dense region reaches are kept as singleton groups, so
//!     the groups always partition the collection.
//! 3.  **Grouping**: labels are turned into ordered lists of document names.
//!
//! A classical multidimensional-scaling projection ([`project_2d`]) and an
//! SVG renderer are provided for eyeballing the result.
//!
//! ## Example
//!
//! ```
//! use cluster::{cluster_documents, ClusterConfig};
//! use perceptual::MinHashSketch;
//!
//! let mut a = MinHashSketch::new(256, 1).unwrap();
//! a.update_all(["hello", "world"]);
//! let b = a.clone();
//! let mut c = MinHashSketch::new(256, 1).unwrap();
//! c.update_all(["something", "else", "entirely"]);
//!
//! let result = cluster_documents(
//!     &["a.html", "b.html", "c.html"],
//!     &[&a, &b, &c],
//!     &ClusterConfig::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(result.clusters.len(), 2);
//! assert_eq!(result.clusters[0], vec!["a.html", "b.html"]);
//! ```

mod dbscan;
mod groups;
mod matrix;
mod projection;
mod types;

pub use crate::dbscan::dbscan;
pub use crate::groups::{cluster_documents, group_by_label, sort_by_size_desc, Clustering};
pub use crate::matrix::DistanceMatrix;
pub use crate::projection::{project_2d, render_svg};
pub use crate::types::{Cluster, ClusterConfig, ClusterError, Label};
