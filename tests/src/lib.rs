//! # Spit Counter Test Suite
//!
//! Unified test crate for flows that cross crate boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── bus_properties.rs   # Replay, last-write-wins, unsubscribe, snapshots
//!     ├── persistence.rs      # Selective persistence, round-trips through storage
//!     ├── async_publish.rs    # Awaited fan-out ordering
//!     └── app_flows.rs        # Services and runtime restarts
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p bus-tests
//!
//! # By area
//! cargo test -p bus-tests integration::persistence::
//! ```

#![allow(dead_code)]
