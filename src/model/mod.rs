//! View model: the column catalog, conditions, parameters and views.

pub mod column;
pub mod condition;
pub mod defaults;
pub mod parameter;
pub mod view;

pub use column::{ColumnMeta, ColumnType, Unit};
pub use condition::{Condition, ConditionType, Operation};
pub use parameter::{Aggregation, AxisSlot, Parameter, ParameterKind, RawParameter, YearRange};
pub use view::{Layout, Style, View};
