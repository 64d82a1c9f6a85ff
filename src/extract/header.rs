//! Header synthesis from non-numeric facts, plus derived metrics.
//!
//! The header is classified by an ordered table of `(pattern, field)` pairs.
//! Each fact is matched against the table once; the first matching row
//! decides the field, and a later fact for the same field overwrites an
//! earlier one. Fact order as emitted by the walker is therefore significant.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{DocumentKey, IxHeader, IxNonFraction, IxNonNumeric};

/// Header field a fact can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    CompanyName,
    SecuritiesCode,
    DocumentName,
    ReportingDate,
    CurrentPeriod,
    Url,
    FiscalYearEnd,
    Tel,
    SpecificBusiness,
    ListedMarket,
    MarketSection,
    BalanceSheet,
    IncomeStatement,
    CashFlows,
    ComprehensiveIncome,
    ChangesInEquity,
    FinancialPosition,
    DividendRevision,
    ForecastRevision,
}

/// Value recorded for a true Tokyo Stock Exchange listing flag.
pub const TOKYO_STOCK_EXCHANGE: &str = "東京証券取引所";

const FIELD_PATTERNS: &[(&str, HeaderField)] = &[
    (r"CompanyName|AssetManagerREIT", HeaderField::CompanyName),
    (r"Securit.*Code$", HeaderField::SecuritiesCode),
    (r"DocumentName", HeaderField::DocumentName),
    (r"_FilingDate$|_ReportingDateOf.*Correction.*", HeaderField::ReportingDate),
    (r"TypeOfCurrentPeriod", HeaderField::CurrentPeriod),
    (r".*URL.*", HeaderField::Url),
    (r"_FiscalYearEnd", HeaderField::FiscalYearEnd),
    (r".*Tel$", HeaderField::Tel),
    (r"SpecificBusiness", HeaderField::SpecificBusiness),
    (r"TokyoStockExchange$", HeaderField::ListedMarket),
    (r"TokyoStockExchange.+", HeaderField::MarketSection),
    (r".*BalanceSheet.*TextBlock$", HeaderField::BalanceSheet),
    (
        r"(.*StatementOfIncome|.*StatementOfProfitOrLoss).*TextBlock$",
        HeaderField::IncomeStatement,
    ),
    (r".*StatementOfCashFlows.*TextBlock$", HeaderField::CashFlows),
    (
        r".*StatementOfComprehensiveIncome.*TextBlock$",
        HeaderField::ComprehensiveIncome,
    ),
    (r".*StatementOfChangesInEquity.*TextBlock$", HeaderField::ChangesInEquity),
    (
        r".*StatementOfFinancialPositionI.*TextBlock$",
        HeaderField::FinancialPosition,
    ),
    (r"CorrectionOfDividendForecast", HeaderField::DividendRevision),
    (r"CorrectionOf.*FinancialForecast", HeaderField::ForecastRevision),
];

static FIELD_TABLE: LazyLock<Vec<(Regex, HeaderField)>> = LazyLock::new(|| {
    FIELD_PATTERNS
        .iter()
        .map(|(pattern, field)| (Regex::new(pattern).expect("header pattern is valid"), *field))
        .collect()
});

/// First table row matching a fact name.
pub fn classify(name: &str) -> Option<HeaderField> {
    FIELD_TABLE
        .iter()
        .find(|(re, _)| re.is_match(name))
        .map(|(_, field)| *field)
}

fn apply(header: &mut IxHeader, field: HeaderField, fact: &IxNonNumeric) {
    let value = || fact.value.clone();
    match field {
        HeaderField::CompanyName => header.company_name = value(),
        HeaderField::SecuritiesCode => header.securities_code = value(),
        HeaderField::DocumentName => header.document_name = value(),
        HeaderField::ReportingDate => header.reporting_date = value(),
        HeaderField::CurrentPeriod => header.current_period = value(),
        HeaderField::Url => header.url = value(),
        HeaderField::FiscalYearEnd => header.fy_year_end = value(),
        HeaderField::Tel => header.tel = value(),
        HeaderField::SpecificBusiness => {
            header.specific_business = Some(fact.value.as_deref() == Some("true"))
        }
        HeaderField::ListedMarket => {
            if fact.is_true() {
                header.listed_market = Some(TOKYO_STOCK_EXCHANGE.to_string());
            }
        }
        HeaderField::MarketSection => {
            if fact.is_true() {
                header.market_section = Some(fact.name.clone());
            }
        }
        HeaderField::BalanceSheet => header.is_bs = true,
        HeaderField::IncomeStatement => header.is_pl = true,
        HeaderField::CashFlows => header.is_cf = true,
        HeaderField::ComprehensiveIncome => header.is_ci = true,
        HeaderField::ChangesInEquity => header.is_sce = true,
        HeaderField::FinancialPosition => header.is_sfp = true,
        HeaderField::DividendRevision => header.dividend_revision = Some(fact.is_true()),
        HeaderField::ForecastRevision => header.forecast_revision = Some(fact.is_true()),
    }
}

/// Build the document header from all non-numeric facts (in emission order)
/// and the numeric facts used for derived metrics.
pub fn synthesize<'a>(
    key: DocumentKey,
    non_numerics: impl IntoIterator<Item = &'a IxNonNumeric>,
    non_fractions: &[IxNonFraction],
) -> IxHeader {
    let mut header = IxHeader {
        head_item_key: Some(key),
        ..Default::default()
    };
    for fact in non_numerics {
        header.report_type = fact.report_type.clone();
        if let Some(field) = classify(&fact.name) {
            apply(&mut header, field, fact);
        }
    }

    let full_year = header.current_period.as_deref() == Some("FY");
    let scope = ConsolidationScope::of(&header);
    header.dividend_increase_rate = dividend_increase_rate(non_fractions, full_year);
    header.forecast_ordinary_income_growth_rate =
        ordinary_income_growth_rate(non_fractions, full_year, scope);

    header.identified()
}

// ── Derived metrics ─────────────────────────────────────────────────────

/// Rate text when an operand is not (yet) disclosed.
pub const NOT_YET_PUBLISHED: &str = "not yet published";
/// Rate text when the prior dividend was zero.
pub const NO_DIVIDEND: &str = "no dividend";
/// Dividend rate label when a zero result is followed by a positive forecast.
pub const DIVIDEND_RESUMED: &str = "dividend resumed";

/// Whether figures are reported for the group or the parent company alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsolidationScope {
    Consolidated,
    NonConsolidated,
}

impl ConsolidationScope {
    /// Non-consolidated when the company or document name says so.
    pub fn of(header: &IxHeader) -> Self {
        let marks = |s: &Option<String>| {
            s.as_deref()
                .is_some_and(|s| s.contains("非連結") || s.contains("NonConsolidated"))
        };
        if marks(&header.company_name) || marks(&header.document_name) {
            Self::NonConsolidated
        } else {
            Self::Consolidated
        }
    }

    fn context_pattern(&self) -> &'static Regex {
        match self {
            Self::Consolidated => &CONSOLIDATED_CONTEXT,
            Self::NonConsolidated => &NON_CONSOLIDATED_CONTEXT,
        }
    }
}

static CONSOLIDATED_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|_)ConsolidatedMember(_|$)").expect("context pattern is valid")
});

static NON_CONSOLIDATED_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|_)NonConsolidatedMember(_|$)").expect("context pattern is valid")
});

/// Context prefixes of the (result, forecast) pair compared for a period.
fn period_prefixes(full_year: bool) -> (&'static str, &'static str) {
    if full_year {
        ("PriorYearDuration", "NextYearDuration")
    } else {
        ("PriorYearDuration", "CurrentYearDuration")
    }
}

fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// First value of `element` whose context starts with `period`, carries
/// `member` and satisfies `scope`.
fn find_value(
    facts: &[IxNonFraction],
    element: &str,
    period: &str,
    member: &str,
    scope: impl Fn(&str) -> bool,
) -> Option<f64> {
    facts
        .iter()
        .filter(|f| local_name(&f.name) == element)
        .filter(|f| f.context.starts_with(period) && f.context.contains(member))
        .filter(|f| scope(&f.context))
        .find_map(IxNonFraction::value)
}

/// `round((forecast - result) / result * 100, 2)` as percentage text.
///
/// Missing operands give [`NOT_YET_PUBLISHED`]; a zero result gives
/// `zero_result`. A rate that rounds to zero prints as `0.0%`, never `-0.0%`.
pub fn growth_rate(
    result: Option<f64>,
    forecast: Option<f64>,
    zero_result: Option<&str>,
) -> Option<String> {
    let (Some(result), Some(forecast)) = (result, forecast) else {
        return Some(NOT_YET_PUBLISHED.to_string());
    };
    if result == 0.0 {
        return zero_result.map(str::to_string);
    }
    let rate = ((forecast - result) / result * 100.0 * 100.0).round() / 100.0;
    if !rate.is_finite() {
        return None;
    }
    let rate = if rate == 0.0 { 0.0 } else { rate };
    Some(format!("{rate:?}%"))
}

/// Change of the annual dividend per share between result and forecast.
pub fn dividend_increase_rate(facts: &[IxNonFraction], full_year: bool) -> Option<String> {
    let (result_period, forecast_period) = period_prefixes(full_year);
    let annual = |ctx: &str| ctx.contains("AnnualMember");
    let result = find_value(facts, "DividendPerShare", result_period, "ResultMember", annual);
    let forecast = find_value(facts, "DividendPerShare", forecast_period, "ForecastMember", annual);
    let zero_result = match forecast {
        Some(f) if f > 0.0 => DIVIDEND_RESUMED,
        _ => NO_DIVIDEND,
    };
    growth_rate(result, forecast, Some(zero_result))
}

/// Forecast change of ordinary income in the document's consolidation scope.
pub fn ordinary_income_growth_rate(
    facts: &[IxNonFraction],
    full_year: bool,
    scope: ConsolidationScope,
) -> Option<String> {
    let (result_period, forecast_period) = period_prefixes(full_year);
    let pattern = scope.context_pattern();
    let in_scope = |ctx: &str| pattern.is_match(ctx);
    let result = find_value(facts, "OrdinaryIncome", result_period, "ResultMember", in_scope);
    let forecast = find_value(facts, "OrdinaryIncome", forecast_period, "ForecastMember", in_scope);
    growth_rate(result, forecast, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceFile;

    fn key() -> DocumentKey {
        DocumentKey::from_file_name("x.zip")
    }

    fn text(name: &str, value: &str) -> IxNonNumeric {
        IxNonNumeric {
            item_key: None,
            head_item_key: key(),
            context: "CurrentYearInstant".into(),
            name: name.into(),
            xsi_nil: false,
            escape: false,
            format: None,
            value: Some(value.into()),
            report_type: Some("edjp".into()),
            ixbrl_role: Some("summary".into()),
            source_file_id: SourceFile::identity_for("s-ixbrl.htm", key()),
        }
        .identified()
    }

    fn number(name: &str, context: &str, value: &str) -> IxNonFraction {
        IxNonFraction {
            item_key: None,
            head_item_key: key(),
            context: context.into(),
            name: name.into(),
            unit_ref: Some("JPY".into()),
            xsi_nil: false,
            decimals: None,
            format: None,
            scale: None,
            sign: None,
            numeric: Some(value.into()),
            display_numeric: Some(value.into()),
            report_type: Some("edjp".into()),
            ixbrl_role: Some("summary".into()),
            source_file_id: SourceFile::identity_for("s-ixbrl.htm", key()),
        }
        .identified()
    }

    #[test]
    fn later_fact_overwrites_same_field() {
        let facts = vec![
            text("tse-ed-t:CompanyNameA", "Acme"),
            text("tse-ed-t:CompanyNameB", "Acme Corp"),
            text("tse-ed-t:DocumentName", "決算短信"),
        ];
        let header = synthesize(key(), &facts, &[]);
        assert_eq!(header.company_name.as_deref(), Some("Acme Corp"));
        assert_eq!(header.report_type.as_deref(), Some("edjp"));
        assert!(header.item_key.is_some());
    }

    #[test]
    fn first_matching_row_wins_per_fact() {
        // `CompanyName` precedes `.*URL.*` in the table.
        assert_eq!(classify("tse-ed-t:CompanyNameURL"), Some(HeaderField::CompanyName));
        assert_eq!(classify("tse-ed-t:SecuritiesCode"), Some(HeaderField::SecuritiesCode));
        assert_eq!(classify("tse-ed-t:Something_FilingDate"), Some(HeaderField::ReportingDate));
        assert_eq!(classify("tse-ed-t:NetSales"), None);
    }

    #[test]
    fn exchange_flags_need_true_value() {
        let mut listed = text("tse-ed-t:TokyoStockExchange", "");
        listed.format = Some("ixt:booleantrue".into());
        let section = text("tse-ed-t:TokyoStockExchangePrime", "true");
        let other = text("tse-ed-t:TokyoStockExchangeGrowth", "false");
        let header = synthesize(key(), &[listed, section, other], &[]);
        assert_eq!(header.listed_market.as_deref(), Some(TOKYO_STOCK_EXCHANGE));
        assert_eq!(
            header.market_section.as_deref(),
            Some("tse-ed-t:TokyoStockExchangePrime")
        );
    }

    #[test]
    fn statement_presence_flags() {
        let facts = vec![
            text("jppfs_cor:BalanceSheetTextBlock", "..."),
            text("jpigp_cor:StatementOfProfitOrLossIFRSTextBlock", "..."),
        ];
        let header = synthesize(key(), &facts, &[]);
        assert!(header.is_bs);
        assert!(header.is_pl);
        assert!(!header.is_cf);
    }

    #[test]
    fn revision_flags() {
        let facts = vec![
            text("tse-ed-t:CorrectionOfDividendForecastInThisQuarter", "true"),
            text("tse-ed-t:CorrectionOfConsolidatedFinancialForecastInThisQuarter", "false"),
        ];
        let header = synthesize(key(), &facts, &[]);
        assert_eq!(header.dividend_revision, Some(true));
        assert_eq!(header.forecast_revision, Some(false));
    }

    #[test]
    fn growth_rate_rules() {
        assert_eq!(
            growth_rate(Some(100.0), Some(120.0), Some(NO_DIVIDEND)).as_deref(),
            Some("20.0%")
        );
        assert_eq!(
            growth_rate(Some(0.0), Some(0.0), Some(NO_DIVIDEND)).as_deref(),
            Some(NO_DIVIDEND)
        );
        assert_eq!(
            growth_rate(Some(100.0), None, Some(NO_DIVIDEND)).as_deref(),
            Some(NOT_YET_PUBLISHED)
        );
        assert_eq!(
            growth_rate(Some(30.0), Some(35.0), None).as_deref(),
            Some("16.67%")
        );
        assert_eq!(growth_rate(Some(0.0), Some(5.0), None), None);
    }

    #[test]
    fn tiny_decline_rounds_to_unsigned_zero() {
        assert_eq!(
            growth_rate(Some(100_000.0), Some(99_999.0), None).as_deref(),
            Some("0.0%")
        );
        assert_eq!(growth_rate(Some(1.0), Some(f64::NAN), None), None);
    }

    #[test]
    fn resumed_dividend_is_labelled() {
        let facts = vec![
            number(
                "tse-ed-t:DividendPerShare",
                "PriorYearDuration_AnnualMember_ResultMember",
                "0",
            ),
            number(
                "tse-ed-t:DividendPerShare",
                "NextYearDuration_AnnualMember_ForecastMember",
                "10",
            ),
        ];
        assert_eq!(
            dividend_increase_rate(&facts, true).as_deref(),
            Some(DIVIDEND_RESUMED)
        );

        let none_paid = vec![
            number(
                "tse-ed-t:DividendPerShare",
                "PriorYearDuration_AnnualMember_ResultMember",
                "0",
            ),
            number(
                "tse-ed-t:DividendPerShare",
                "NextYearDuration_AnnualMember_ForecastMember",
                "0",
            ),
        ];
        assert_eq!(
            dividend_increase_rate(&none_paid, true).as_deref(),
            Some(NO_DIVIDEND)
        );
    }

    #[test]
    fn dividend_rate_uses_annual_contexts_for_period() {
        let facts = vec![
            number(
                "tse-ed-t:DividendPerShare",
                "PriorYearDuration_AnnualMember_ResultMember",
                "100",
            ),
            number(
                "tse-ed-t:DividendPerShare",
                "CurrentYearDuration_SecondQuarterMember_ResultMember",
                "50",
            ),
            number(
                "tse-ed-t:DividendPerShare",
                "CurrentYearDuration_AnnualMember_ForecastMember",
                "120",
            ),
            number(
                "tse-ed-t:DividendPerShare",
                "NextYearDuration_AnnualMember_ForecastMember",
                "150",
            ),
        ];
        assert_eq!(dividend_increase_rate(&facts, false).as_deref(), Some("20.0%"));
        assert_eq!(dividend_increase_rate(&facts, true).as_deref(), Some("50.0%"));
    }

    #[test]
    fn ordinary_income_respects_consolidation_scope() {
        let facts = vec![
            number(
                "tse-ed-t:OrdinaryIncome",
                "PriorYearDuration_NonConsolidatedMember_ResultMember",
                "200",
            ),
            number(
                "tse-ed-t:OrdinaryIncome",
                "PriorYearDuration_ConsolidatedMember_ResultMember",
                "1000",
            ),
            number(
                "tse-ed-t:OrdinaryIncome",
                "CurrentYearDuration_ConsolidatedMember_ForecastMember",
                "1100",
            ),
            number(
                "tse-ed-t:OrdinaryIncome",
                "CurrentYearDuration_NonConsolidatedMember_ForecastMember",
                "150",
            ),
        ];
        assert_eq!(
            ordinary_income_growth_rate(&facts, false, ConsolidationScope::Consolidated).as_deref(),
            Some("10.0%")
        );
        assert_eq!(
            ordinary_income_growth_rate(&facts, false, ConsolidationScope::NonConsolidated)
                .as_deref(),
            Some("-25.0%")
        );
    }

    #[test]
    fn scope_from_document_name() {
        let header = IxHeader {
            document_name: Some("2025年3月期 決算短信〔日本基準〕(非連結)".into()),
            ..Default::default()
        };
        assert_eq!(ConsolidationScope::of(&header), ConsolidationScope::NonConsolidated);
        assert_eq!(
            ConsolidationScope::of(&IxHeader::default()),
            ConsolidationScope::Consolidated
        );
    }
}
