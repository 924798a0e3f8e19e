// Domain-layer modules: signals, classification, scoring and orchestration
pub mod qualification {
    pub use crate::qualification::*;
}

pub mod scoring {
    pub use crate::scoring::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod signals {
    pub use crate::signals::*;
}
