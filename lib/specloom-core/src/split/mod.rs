//! Splitting a document into a tree of files.
//!
//! The split engine turns one assembled document into:
//! - one file per schema component, under the schemas root,
//! - one file per path item, under the paths root,
//! - an index file whose `paths` and `components.schemas` entries are `$ref`
//!   links to those files.
//!
//! Every `#/components/schemas/<Name>` reference is rewritten into a link that
//! is relative to the file holding it. A component or path item whose source
//! location lies under the matching root is written to the mirrored location,
//! with the file name replaced by its identifier.
//!
//! ```rust
//! use specloom_core::split::relative_link;
//! use std::path::Path;
//!
//! let link = relative_link(
//!     Path::new("/out/paths/resturant/restaurant_menu.yaml"),
//!     Path::new("/out/schemas/resturant/Menu.yaml"),
//! );
//! assert_eq!(link, "../../schemas/resturant/Menu.yaml");
//! ```

mod fragment;
mod join;
mod layout;
mod rewrite;
mod splitter;
mod target;

pub use fragment::{Fragment, SplitResult};
pub use join::join_split;
pub use layout::SplitLayout;
pub use rewrite::{SCHEMA_REF_PREFIX, restore_refs, rewrite_refs, schema_name};
pub use splitter::{OpenApiSplitExt, OpenApiSplitter, PathHint, RelativeRefSplitter, SourceHints};
pub use target::{normalize, relative_link, target_path};
