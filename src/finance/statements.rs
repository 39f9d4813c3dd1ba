//! The four financial statements and their fixed column catalogs
//!
//! Each statement lives in its own named sheet and is keyed by a date column.
//! Monetary metrics are expressed in millions after cleaning; per-share figures
//! (the quarterly stock sheet) are left as reported.

use std::fmt;

/// A metric plotted on the overview tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricPlot {
    pub column: &'static str,
    pub title: &'static str,
}

const INCOME_PLOTS: &[MetricPlot] = &[
    MetricPlot {
        column: "totalRevenue",
        title: "Total Revenue Over Time",
    },
    MetricPlot {
        column: "operatingIncome",
        title: "Operating Income Over Time",
    },
    MetricPlot {
        column: "depreciation",
        title: "Depreciation Over Time",
    },
    MetricPlot {
        column: "depreciationAndAmortization",
        title: "Depreciation and Amortization Over Time",
    },
    MetricPlot {
        column: "netIncome",
        title: "Net Income Over Time",
    },
];

const BALANCE_PLOTS: &[MetricPlot] = &[
    MetricPlot {
        column: "totalAssets",
        title: "Total Assets Over Time",
    },
    MetricPlot {
        column: "propertyPlantEquipment",
        title: "Property, Plant, and Equipment Over Time",
    },
    MetricPlot {
        column: "totalLiabilities",
        title: "Total Liabilities Over Time",
    },
    MetricPlot {
        column: "totalCurrentLiabilities",
        title: "Total Current Liabilities Over Time",
    },
    MetricPlot {
        column: "totalShareholderEquity",
        title: "Total Shareholder Equity Over Time",
    },
];

const CASH_FLOW_PLOTS: &[MetricPlot] = &[
    MetricPlot {
        column: "capitalExpenditures",
        title: "Capital Expenditures Over Time",
    },
    MetricPlot {
        column: "cashflowFromInvestment",
        title: "Cash Flow from Investment Over Time",
    },
    MetricPlot {
        column: "cashflowFromFinancing",
        title: "Cash Flow from Financing Over Time",
    },
    MetricPlot {
        column: "dividendPayout",
        title: "Dividend Payout Over Time",
    },
];

/// One sheet of the source workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statement {
    Income,
    Balance,
    CashFlow,
    QuarterlyStock,
}

impl Statement {
    /// All statements in workbook order
    pub const ALL: [Statement; 4] = [
        Statement::Income,
        Statement::Balance,
        Statement::CashFlow,
        Statement::QuarterlyStock,
    ];

    /// Sheet name in the workbook
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Statement::Income => "Income Statement",
            Statement::Balance => "Balance Sheet",
            Statement::CashFlow => "Cash Flow Statement",
            Statement::QuarterlyStock => "Quarterly Stock Data",
        }
    }

    /// Column holding the reporting date (the lookup key after cleaning)
    pub fn date_column(&self) -> &'static str {
        match self {
            Statement::QuarterlyStock => "Quarter End Date",
            _ => "fiscalDateEnding",
        }
    }

    /// Monetary columns converted to millions of currency units
    pub fn monetary_metrics(&self) -> &'static [&'static str] {
        match self {
            Statement::Income => &[
                "totalRevenue",
                "operatingIncome",
                "depreciation",
                "depreciationAndAmortization",
                "netIncome",
            ],
            Statement::Balance => &[
                "totalAssets",
                "propertyPlantEquipment",
                "totalLiabilities",
                "totalCurrentLiabilities",
                "totalShareholderEquity",
            ],
            Statement::CashFlow => &[
                "capitalExpenditures",
                "cashflowFromInvestment",
                "cashflowFromFinancing",
                "dividendPayout",
            ],
            Statement::QuarterlyStock => &[],
        }
    }

    /// Known misspelled column names: (misspelled, correct)
    pub fn column_fixes(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Statement::Income => &[("opeartingIncome", "operatingIncome")],
            Statement::CashFlow => &[("capitalExpenditure", "capitalExpenditures")],
            _ => &[],
        }
    }

    /// Line charts shown on the overview tab, in display order
    pub fn overview_plots(&self) -> &'static [MetricPlot] {
        match self {
            Statement::Income => INCOME_PLOTS,
            Statement::Balance => BALANCE_PLOTS,
            Statement::CashFlow => CASH_FLOW_PLOTS,
            Statement::QuarterlyStock => &[],
        }
    }

    /// Section heading on the overview tab
    pub fn section_title(&self) -> &'static str {
        match self {
            Statement::Income => "Income Statement Metrics",
            Statement::Balance => "Balance Sheet Metrics",
            Statement::CashFlow => "Cash Flow Statement Metrics",
            Statement::QuarterlyStock => "Quarterly Stock Metrics",
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_names_are_distinct() {
        let mut names: Vec<&str> = Statement::ALL.iter().map(|s| s.sheet_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_stock_sheet_is_not_scaled() {
        assert!(Statement::QuarterlyStock.monetary_metrics().is_empty());
        assert_eq!(Statement::QuarterlyStock.date_column(), "Quarter End Date");
    }

    #[test]
    fn test_overview_plot_catalog() {
        let counts: Vec<usize> = Statement::ALL
            .iter()
            .map(|s| s.overview_plots().len())
            .collect();
        assert_eq!(counts, vec![5, 5, 4, 0]);
        assert_eq!(
            Statement::CashFlow.overview_plots()[0],
            MetricPlot {
                column: "capitalExpenditures",
                title: "Capital Expenditures Over Time",
            }
        );
    }

    #[test]
    fn test_overview_plots_are_monetary() {
        // Every overview line chart is in millions, so it must be a scaled metric
        for statement in Statement::ALL {
            for plot in statement.overview_plots() {
                assert!(
                    statement.monetary_metrics().contains(&plot.column),
                    "{} not scaled on {}",
                    plot.column,
                    statement
                );
            }
        }
    }

    #[test]
    fn test_fixes_target_known_metrics() {
        for statement in Statement::ALL {
            for (_, correct) in statement.column_fixes() {
                assert!(statement.monetary_metrics().contains(correct));
            }
        }
    }
}
