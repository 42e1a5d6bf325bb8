use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use property_invest_core::analysis::{investment, scoring, sensitivity, PropertyScenario};
use property_invest_core::mortgage::amortization::{self, LoanTerms};
use property_invest_core::mortgage::{calculator, ownership};
use property_invest_core::ratios::depreciation::{self, DepreciationInput};
use property_invest_core::ratios::income;
use property_invest_core::ratios::rental_comps::{self, RentalComparable};
use property_invest_core::time_value::{self, IrrOptions};
use property_invest_core::Rate;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: DeserializeOwned>(input_json: &str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

fn render<T: Serialize>(output: &T) -> NapiResult<String> {
    serde_json::to_string(output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Mortgage
// ---------------------------------------------------------------------------

#[napi]
pub fn monthly_payment(input_json: String) -> NapiResult<String> {
    let terms: LoanTerms = parse(&input_json)?;
    let payment = amortization::monthly_payment(terms.principal, terms.annual_rate, terms.term_years)
        .map_err(to_napi_error)?;
    render(&serde_json::json!({ "monthly_payment": payment }))
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    #[derive(Deserialize)]
    struct ScheduleRequest {
        #[serde(flatten)]
        terms: LoanTerms,
        #[serde(default)]
        extra_monthly: Decimal,
    }

    let request: ScheduleRequest = parse(&input_json)?;
    if request.extra_monthly > Decimal::ZERO {
        let outcome =
            amortization::amortization_with_extra_payment(&request.terms, request.extra_monthly)
                .map_err(to_napi_error)?;
        render(&outcome)
    } else {
        let schedule = amortization::amortization_schedule(&request.terms).map_err(to_napi_error)?;
        render(&schedule)
    }
}

#[napi]
pub fn analyze_mortgage(input_json: String) -> NapiResult<String> {
    let input: calculator::MortgageInput = parse(&input_json)?;
    let output = calculator::analyze_mortgage(&input).map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn total_cost_of_ownership(input_json: String) -> NapiResult<String> {
    let input: ownership::OwnershipInput = parse(&input_json)?;
    let output = ownership::total_cost_of_ownership(&input).map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Cash-flow metrics
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CashFlowRequest {
    initial_investment: Decimal,
    cash_flows: Vec<Decimal>,
}

#[napi]
pub fn npv(input_json: String) -> NapiResult<String> {
    #[derive(Deserialize)]
    struct NpvRequest {
        #[serde(flatten)]
        flows: CashFlowRequest,
        discount_rate: Rate,
    }

    let request: NpvRequest = parse(&input_json)?;
    let value = time_value::npv(
        request.flows.initial_investment,
        &request.flows.cash_flows,
        request.discount_rate,
    )
    .map_err(to_napi_error)?;
    render(&serde_json::json!({ "npv": value }))
}

#[napi]
pub fn irr(input_json: String) -> NapiResult<String> {
    #[derive(Deserialize)]
    struct IrrRequest {
        #[serde(flatten)]
        flows: CashFlowRequest,
        #[serde(default)]
        options: IrrOptions,
    }

    let request: IrrRequest = parse(&input_json)?;
    let rate = time_value::irr(
        request.flows.initial_investment,
        &request.flows.cash_flows,
        &request.options,
    )
    .map_err(to_napi_error)?;
    render(&serde_json::json!({ "irr": rate, "converged": rate.is_some() }))
}

#[napi]
pub fn mirr(input_json: String) -> NapiResult<String> {
    #[derive(Deserialize)]
    struct MirrRequest {
        #[serde(flatten)]
        flows: CashFlowRequest,
        finance_rate: Rate,
        reinvest_rate: Rate,
    }

    let request: MirrRequest = parse(&input_json)?;
    let rate = time_value::mirr(
        request.flows.initial_investment,
        &request.flows.cash_flows,
        request.finance_rate,
        request.reinvest_rate,
    )
    .map_err(to_napi_error)?;
    render(&serde_json::json!({ "mirr": rate }))
}

// ---------------------------------------------------------------------------
// Ratios
// ---------------------------------------------------------------------------

#[napi]
pub fn one_percent_rule(input_json: String) -> NapiResult<String> {
    #[derive(Deserialize)]
    struct Request {
        monthly_rent: Decimal,
        purchase_price: Decimal,
    }

    let request: Request = parse(&input_json)?;
    let rule = income::one_percent_rule(request.monthly_rent, request.purchase_price)
        .map_err(to_napi_error)?;
    render(&rule)
}

#[napi]
pub fn break_even(input_json: String) -> NapiResult<String> {
    #[derive(Deserialize)]
    struct Request {
        monthly_costs: Decimal,
        monthly_rental_income: Decimal,
    }

    let request: Request = parse(&input_json)?;
    let analysis = income::break_even(request.monthly_costs, request.monthly_rental_income)
        .map_err(to_napi_error)?;
    render(&analysis)
}

#[napi]
pub fn depreciation_tax_benefit(input_json: String) -> NapiResult<String> {
    let input: DepreciationInput = parse(&input_json)?;
    let benefit = depreciation::depreciation_tax_benefit(&input).map_err(to_napi_error)?;
    render(&benefit)
}

#[napi]
pub fn rental_comps(input_json: String) -> NapiResult<String> {
    #[derive(Deserialize)]
    struct Request {
        monthly_rent: Decimal,
        comparables: Vec<RentalComparable>,
        area: Decimal,
    }

    let request: Request = parse(&input_json)?;
    let result = rental_comps::rental_comps(request.monthly_rent, &request.comparables, request.area)
        .map_err(to_napi_error)?;
    render(&result)
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[napi]
pub fn sensitivity_analysis(input_json: String) -> NapiResult<String> {
    let scenario: PropertyScenario = parse(&input_json)?;
    let output = sensitivity::sensitivity_analysis(&scenario).map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn investment_score(input_json: String) -> NapiResult<String> {
    let input: scoring::ScoreInput = parse(&input_json)?;
    let output = scoring::investment_score(&input).map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn analyze_property(input_json: String) -> NapiResult<String> {
    let scenario: PropertyScenario = parse(&input_json)?;
    let output = investment::analyze_property(&scenario).map_err(to_napi_error)?;
    render(&output)
}
