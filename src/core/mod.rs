mod projector;
mod types;

pub use projector::{
    format_usd, income_spending_comparison, monthly_budget_breakdown, project,
};
pub use types::{CategoryAmount, Inputs, Projection, TimelinePoint};
