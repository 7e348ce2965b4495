//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module    | Commands handled            |
//! |-----------|-----------------------------|
//! | `station` | `Scan`, `Complete`          |
//! | `catalog` | `Catalog`                   |
//! | `order`   | `Order submit`, `Order new` |
//! | `config`  | `Config`                    |

pub mod catalog;
pub mod config;
pub mod order;
pub mod station;

pub use catalog::cmd_catalog;
pub use config::cmd_config;
pub use order::{cmd_order_new, cmd_order_submit};
pub use station::{cmd_complete, cmd_scan};
