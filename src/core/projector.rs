use super::types::{CategoryAmount, Inputs, Projection, TimelinePoint};

const TIMELINE_MONTHS: u32 = 24;

pub fn project(inputs: &Inputs) -> Projection {
    let monthly_income_usd = inputs.annual_income_gbp / 12.0 * inputs.exchange_rate;
    let total_available_usd = monthly_income_usd + inputs.savings_usd;
    let october_shortfall_usd = (inputs.october_spending_usd - total_available_usd).max(0.0);
    let remaining_after_october_usd =
        (total_available_usd - inputs.october_spending_usd).max(0.0);

    let total_monthly_income_usd = monthly_income_usd + inputs.additional_monthly_income_usd;
    let monthly_surplus_usd = total_monthly_income_usd - inputs.future_monthly_spending_usd;

    // Partial months count as whole months; the division only happens when the
    // surplus is strictly positive.
    let months_to_recover = if monthly_surplus_usd > 0.0 {
        Some((october_shortfall_usd / monthly_surplus_usd).ceil() as u32)
    } else {
        None
    };

    Projection {
        monthly_income_usd,
        total_available_usd,
        october_shortfall_usd,
        remaining_after_october_usd,
        total_monthly_income_usd,
        monthly_surplus_usd,
        months_to_recover,
        max_sustainable_monthly_spending_usd: total_monthly_income_usd,
        timeline: build_timeline(october_shortfall_usd, monthly_surplus_usd),
    }
}

fn build_timeline(october_shortfall_usd: f64, monthly_surplus_usd: f64) -> Vec<TimelinePoint> {
    (0..=TIMELINE_MONTHS)
        .map(|month| TimelinePoint {
            month: if month == 0 {
                "Oct".to_string()
            } else {
                month.to_string()
            },
            cumulative_balance_usd: -october_shortfall_usd
                + month as f64 * monthly_surplus_usd,
        })
        .collect()
}

pub fn income_spending_comparison(
    inputs: &Inputs,
    projection: &Projection,
) -> Vec<CategoryAmount> {
    vec![
        CategoryAmount {
            label: "Monthly Income",
            amount_usd: projection.total_monthly_income_usd,
        },
        CategoryAmount {
            label: "Monthly Spending",
            amount_usd: inputs.future_monthly_spending_usd,
        },
        CategoryAmount {
            label: "October Spending",
            amount_usd: inputs.october_spending_usd,
        },
    ]
}

pub fn monthly_budget_breakdown(
    inputs: &Inputs,
    projection: &Projection,
) -> Vec<CategoryAmount> {
    [
        ("Regular Income", projection.monthly_income_usd),
        ("Additional Income", inputs.additional_monthly_income_usd),
        ("Monthly Spending", inputs.future_monthly_spending_usd),
    ]
    .into_iter()
    .filter(|(_, amount)| *amount > 0.0)
    .map(|(label, amount_usd)| CategoryAmount { label, amount_usd })
    .collect()
}

pub fn format_usd(value: f64) -> String {
    let magnitude = format!("{:.2}", value.abs());
    let (int_part, frac_part) = magnitude.split_once('.').unwrap_or((magnitude.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, digit) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("${sign}{grouped}.{frac_part}")
}
