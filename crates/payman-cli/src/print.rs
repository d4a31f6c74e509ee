//! Console rendering of reports and payout results.

use std::fmt::Write;

use payman_types::{DelegateReport, OperationHash, MUTEZ_PER_TEZ};

/// Format mutez as a tez amount with six decimals.
pub fn format_tez(mutez: u64) -> String {
    format!("{}.{:06}", mutez / MUTEZ_PER_TEZ, mutez % MUTEZ_PER_TEZ)
}

/// Render a report as a plain text table.
pub fn report_table(report: &DelegateReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Delegate {}  cycle {}  fee {}  staking balance {}  rewards {}",
        report.delegate_address,
        report.cycle,
        report.delegate_fee,
        format_tez(report.staking_balance),
        format_tez(report.total_rewards),
    );
    let _ = writeln!(
        out,
        "{:<36}  {:>8}  {:>18}  {:>16}  {:>16}  {:>16}",
        "DELEGATOR", "SHARE", "BALANCE", "GROSS", "FEE", "NET"
    );
    for d in &report.delegations {
        let _ = writeln!(
            out,
            "{:<36}  {:>7.4}%  {:>18}  {:>16}  {:>16}  {:>16}",
            d.delegator_address,
            d.stake_share * 100.0,
            format_tez(d.balance),
            format_tez(d.gross_rewards),
            format_tez(d.fee_amount),
            format_tez(d.net_rewards),
        );
    }
    let totals = report.totals();
    let _ = writeln!(
        out,
        "{:<36}  {:>8}  {:>18}  {:>16}  {:>16}  {:>16}",
        "TOTAL",
        "",
        "",
        format_tez(totals.gross_rewards),
        format_tez(totals.fee_amount),
        format_tez(totals.net_rewards),
    );
    out
}

/// Print each operation hash on its own line.
pub fn print_hashes(hashes: &[OperationHash]) {
    for hash in hashes {
        println!("Successful operation: {hash}");
    }
}

#[cfg(test)]
mod tests {
    use payman_types::{DelegationReport, FeeRate};

    use super::*;

    #[test]
    fn test_format_tez() {
        assert_eq!(format_tez(0), "0.000000");
        assert_eq!(format_tez(450_000), "0.450000");
        assert_eq!(format_tez(12_000_001), "12.000001");
    }

    #[test]
    fn test_report_table_has_row_per_delegation_and_total() {
        let report = DelegateReport {
            delegate_address: "tz1baker".to_string(),
            cycle: 7,
            delegate_fee: FeeRate::from_fraction(0.1).expect("fee"),
            staking_balance: 10_000_000,
            total_rewards: 1_000_000,
            delegations: vec![DelegationReport {
                delegator_address: "tz1a".to_string(),
                balance: 5_000_000,
                stake_share: 0.5,
                gross_rewards: 500_000,
                fee_amount: 50_000,
                net_rewards: 450_000,
            }],
        };
        let table = report_table(&report);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("fee 10%"));
        assert!(lines[2].starts_with("tz1a"));
        assert!(lines[2].contains("0.450000"));
        assert!(lines[3].starts_with("TOTAL"));
    }
}
