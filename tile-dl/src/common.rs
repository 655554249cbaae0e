pub use crate::error::{Error, Result};
pub use bbox::{prelude::*, Transform, HW, TLBR};
pub use indexmap::IndexMap;
pub use itertools::Itertools as _;
pub use label::{ClassMap, Label};
pub use log::{debug, info, warn};
pub use ndarray::{Array2, Array3};
pub use noisy_float::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::{
    collections::{hash_map, HashMap},
    fmt::Debug,
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};
