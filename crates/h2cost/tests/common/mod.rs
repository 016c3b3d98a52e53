//! Shared model inputs for the integration tests

#![allow(dead_code)]

use h2cost::{load_input_str, Defaults, TableStore};
use h2cost_markdown::MarkdownReadOptions;

/// Builtin functions only, fed directly with the values plugins would produce.
///
/// One construction year, one operating year, no taxes, inflation, return,
/// debt, salvage or working capital: the cost is `(K + N + F + V) / Q`.
pub const CLOSED_FORM: &str = "\
# Workflow

Name | Type | Position
--- | --- | ---
production_scaling | function | 0
initial_equity_depreciable_capital | function | 1
non_depreciable_capital_costs | function | 2
replacement_costs | function | 3
fixed_operating_costs | function | 4
variable_operating_costs | function | 5

# Financial Input Values

Name | Value
--- | ---
ref year | 2020
startup year | 2020
basis year | 2020
current year capital costs | 2020
startup time | 0
plant life | 1
depreciation length | 20
depreciation type | MACRS
equity | 100%
interest | 0%
debt | Constant
startup cost fixed | 100%
startup revenues | 100%
startup cost variable | 100%
decommissioning | 0%
salvage | 0%
inflation | 0%
irr | 0%
state tax | 0%
federal tax | 0%
working capital | 0%

# Construction

Name | Value
--- | ---
1. Year | 100%

# Technical Operating Parameters and Specifications

Name | Value
--- | ---
Output per Year at Gate | 10

# Depreciable Capital Costs

Name | Value
--- | ---
Inflated | 1000

# Non-Depreciable Capital Costs

Name | Value
--- | ---
Inflated | 100

# Replacement

Name | Value
--- | ---
Total | 0

# Fixed Operating Costs

Name | Value
--- | ---
Total | 50

# Variable Operating Costs

Name | Value
--- | ---
Total | 30
";

/// A small electrolysis plant run through the standard workflow
pub const PLANT: &str = "\
# Construction

Name | Value
--- | ---
1. Year | 100%

# Technical Operating Parameters and Specifications

Name | Value
--- | ---
Plant Design Capacity (kg of H2/day) | 1,000
Operating Capacity Factor (%) | 90%

# Direct Capital Cost - Electrolyzer

Name | Value
--- | ---
Stack | 1,000,000
Balance of plant | 500,000

# Indirect Capital Cost

Name | Value
--- | ---
Engineering | 150,000

# Non-Depreciable Capital Costs

Name | Value
--- | ---
Cost of land ($ per acre) | 50,000
Land required (acres) | 5

# Planned Replacement

Name | Frequency (years) | Cost ($)
--- | --- | ---
Stack | 10 | 200,000

# Fixed Operating Costs

Name | Value
--- | ---
staff | 2
hourly labor cost | 50

# Other Fixed Operating Cost - Insurance

Name | Value
--- | ---
Insurance | 10,000

# Utilities

Name | Cost | Usage per kg H2 | Price Conversion Factor
--- | --- | --- | ---
Electricity | 0.05 | 55 | 1

# Other Variable Operating Cost - Water

Name | Value
--- | ---
Water | 2,000
";

pub fn closed_form() -> TableStore {
    load_input_str(CLOSED_FORM, &Defaults::None, &MarkdownReadOptions::default()).unwrap()
}

pub fn plant() -> TableStore {
    load_input_str(PLANT, &Defaults::Bundled, &MarkdownReadOptions::default()).unwrap()
}
