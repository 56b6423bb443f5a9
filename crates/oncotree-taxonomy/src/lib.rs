// Copyright 2025 Memorial Sloan Kettering Cancer Center
// SPDX-License-Identifier: Apache-2.0

/*!
# OncoTree Release Reconciliation

Builds, connects and checks the dated releases of the OncoTree taxonomy:

- Tree building from tab-separated source tables
- Breadth-first indexing (code sets, main types, flattening)
- Mapping generation between adjacent releases
- Transitive precursor resolution across the mapping history
- Validation of built trees and of the mapping chain

## Data Flow

```text
tsv/<release>.txt ──TreeBuilder──▶ <release>.json
                        ▲                │
        PrecursorResolver│                │ TreeIndexer
                        │                ▼
mappings/<a>_to_<b>.tsv ◀──MappingGenerator
           │
           └──MappingValidator──▶ ValidationReport
```

## Modules

- `tree` - node arena, persisted documents, breadth-first indexing
- `builder` - source table parsing and tree construction
- `mapping` - mapping files and their generation
- `precursor` - lineage accumulator and history sources
- `storage` - create-only file-system store
- `validator` - tree and mapping chain validation
- `query`, `export` - read-only views for serving layers
- `pipeline` - batch entry points driven by configuration
*/

pub mod builder;
pub mod export;
pub mod mapping;
pub mod pipeline;
pub mod precursor;
pub mod query;
pub mod release;
pub mod storage;
pub mod tree;
pub mod types;
pub mod validator;

// Re-export commonly used types
pub use builder::TreeBuilder;
pub use mapping::generator::{GenerationReport, MappingGenerator};
pub use mapping::{MappingFile, MappingName, MappingRow};
pub use precursor::{MappingHistory, PrecursorMap, PrecursorResolver, PrecursorSource};
pub use release::ReleaseId;
pub use storage::{ReleaseStore, WriteOutcome};
pub use tree::{Node, Tree};
pub use types::{TaxonomyError, TaxonomyResult};
pub use validator::{MappingValidator, ValidationReport};
