//! Collects contract and token information for a list of contracts, one contract at a time.
//!
//! For every contract the source code endpoint is queried first; only if it yields a record the token
//! endpoint is queried as well, merging its result into the same record. Failed requests are logged and
//! skipped, they never abort the run. After each contract the harvester sleeps for a fixed duration to
//! stay below the explorer's rate limit. The collected [`ResultSet`] is written at once by [`save`].

use crate::api::Explorer;
use crate::error::Error;
use crate::model::ContractInfo;
use crate::model::ResultSet;
use log::debug;
use log::warn;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

pub struct Harvester<'a, E: Explorer> {
    explorer: &'a E,
    rate_limit_delay: Duration,
}

impl<'a, E: Explorer> Harvester<'a, E> {
    pub fn new(explorer: &'a E, rate_limit_delay: Duration) -> Self {
        Harvester {
            explorer,
            rate_limit_delay,
        }
    }

    /// Processes all contracts in order, returning the information of those the explorer knows. Progress
    /// is reported line by line to `progress`, usually stdout.
    pub fn run<W: Write>(&self, contracts: &[String], progress: &mut W) -> Result<ResultSet, Error> {
        let mut results = ResultSet::new();

        report(progress, "Gathering contract information from the explorer...")?;
        for (idx, address) in contracts.iter().enumerate() {
            report(progress, &format!("\nProcessing contract {}/{}: {address}", idx + 1, contracts.len()))?;

            match self.harvest(address, progress)? {
                Some(info) => {
                    results.insert(address.clone(), info);
                }

                None => report(progress, "Failed to get contract info")?,
            }

            std::thread::sleep(self.rate_limit_delay);
        }

        Ok(results)
    }

    fn harvest<W: Write>(&self, address: &str, progress: &mut W) -> Result<Option<ContractInfo>, Error> {
        let contract = match self.explorer.get_contract_info(address) {
            Ok(Some(contract)) => contract,

            Ok(None) => {
                debug!("No contract info available for {address}");
                return Ok(None);
            }

            Err(why) => {
                warn!("Error getting info for {address}: {why}");
                return Ok(None);
            }
        };

        report(progress, "Contract info retrieved")?;
        let mut info = ContractInfo::new(contract);

        match self.explorer.get_token_info(address) {
            Ok(Some(token)) => {
                report(
                    progress,
                    &format!("Token info retrieved: {} ({})", token.token_name, token.token_symbol),
                )?;
                info.token = Some(token);
            }

            Ok(None) => debug!("No token info available for {address}"),
            Err(why) => warn!("Error getting token info for {address}: {why}"),
        }

        Ok(Some(info))
    }
}

fn report<W: Write>(progress: &mut W, line: &str) -> Result<(), Error> {
    writeln!(progress, "{line}").map_err(|why| Error::OutputWrite("progress".to_string(), why))
}

/// Writes the results as 2-space indented JSON to `path`, overwriting any existing file.
pub fn save(results: &ResultSet, path: &Path) -> Result<(), Error> {
    let content = serde_json::to_string_pretty(results).map_err(Error::OutputSerialize)?;
    std::fs::write(path, content).map_err(|why| Error::OutputWrite(path.display().to_string(), why))
}

/// Returns the run summary; the number of processed contracts followed by one line per collected contract.
pub fn summary(processed: usize, results: &ResultSet) -> String {
    let contracts: String = results
        .iter()
        .map(|(address, info)| format!("   - {address}: {} ({})\n", info.contract.contract_name, info.token_symbol()))
        .collect();

    format!(
        "Summary:\n   Total contracts processed: {processed}\n   Successful retrievals: {}\n{contracts}",
        results.len()
    )
}

#[cfg(test)]
mod tests {
    use super::save;
    use super::summary;
    use super::Harvester;
    use crate::api::Explorer;
    use crate::error::Error;
    use crate::model::tests::contract_record;
    use crate::model::ContractInfo;
    use crate::model::ContractRecord;
    use crate::model::ResultSet;
    use crate::model::TokenRecord;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::time::Duration;
    use std::time::Instant;

    #[derive(Clone, Copy)]
    enum Outcome {
        Record,
        Empty,
        Fail,
    }

    #[derive(Default)]
    struct FakeExplorer {
        contracts: HashMap<String, Outcome>,
        tokens: HashMap<String, Outcome>,
        token_requests: RefCell<Vec<String>>,
    }

    impl FakeExplorer {
        fn with(mut self, address: &str, contract: Outcome, token: Outcome) -> Self {
            self.contracts.insert(address.to_string(), contract);
            self.tokens.insert(address.to_string(), token);
            self
        }
    }

    impl Explorer for FakeExplorer {
        fn get_contract_info(&self, address: &str) -> Result<Option<ContractRecord>, Error> {
            match self.contracts.get(address).copied().unwrap_or(Outcome::Empty) {
                Outcome::Record => Ok(Some(contract_record(address, &format!("Contract{address}")))),
                Outcome::Empty => Ok(None),
                Outcome::Fail => Err(Error::HttpStatus(502, address.to_string())),
            }
        }

        fn get_token_info(&self, address: &str) -> Result<Option<TokenRecord>, Error> {
            self.token_requests.borrow_mut().push(address.to_string());

            match self.tokens.get(address).copied().unwrap_or(Outcome::Empty) {
                Outcome::Record => Ok(Some(TokenRecord::new(
                    "Dayana".to_string(),
                    format!("T{address}"),
                    "18".to_string(),
                    "1000".to_string(),
                ))),
                Outcome::Empty => Ok(None),
                Outcome::Fail => Err(Error::HttpStatus(500, address.to_string())),
            }
        }
    }

    fn addresses(addresses: &[&str]) -> Vec<String> {
        addresses.iter().map(|address| address.to_string()).collect()
    }

    fn run(explorer: &FakeExplorer, rate_limit_delay: Duration, contracts: &[&str]) -> ResultSet {
        Harvester::new(explorer, rate_limit_delay)
            .run(&addresses(contracts), &mut std::io::sink())
            .unwrap()
    }

    #[test]
    fn run_merges_token_info() {
        let explorer = FakeExplorer::default().with("0xA", Outcome::Record, Outcome::Record);
        let results = run(&explorer, Duration::ZERO, &["0xA"]);

        let info = &results["0xA"];
        assert_eq!(info.contract.contract_name, "Contract0xA");
        assert_eq!(info.token.as_ref().map(|token| token.token_symbol.as_str()), Some("T0xA"));
        assert_eq!(info.token.as_ref().map(|token| token.token_type.as_str()), Some("ERC20"));
    }

    #[test]
    fn run_skips_failed_contracts() {
        let explorer = FakeExplorer::default()
            .with("0xA", Outcome::Fail, Outcome::Record)
            .with("0xB", Outcome::Empty, Outcome::Record)
            .with("0xC", Outcome::Record, Outcome::Empty);

        let results = run(&explorer, Duration::ZERO, &["0xA", "0xB", "0xC"]);

        assert_eq!(results.len(), 1);
        assert!(!results.contains_key("0xA"));
        assert!(!results.contains_key("0xB"));

        // The token endpoint is only queried for contracts with contract info
        assert_eq!(*explorer.token_requests.borrow(), vec!["0xC".to_string()]);
    }

    #[test]
    fn run_keeps_contract_without_token() {
        let explorer = FakeExplorer::default()
            .with("0xA", Outcome::Record, Outcome::Fail)
            .with("0xB", Outcome::Record, Outcome::Empty);

        let results = run(&explorer, Duration::ZERO, &["0xA", "0xB"]);

        for address in ["0xA", "0xB"] {
            let object = serde_json::to_value(&results[address]).unwrap();
            assert_eq!(object.as_object().unwrap().len(), 16);
            assert!(object.get("token_name").is_none());
        }
    }

    #[test]
    fn run_preserves_order() {
        let explorer = FakeExplorer::default()
            .with("0xC", Outcome::Record, Outcome::Record)
            .with("0xA", Outcome::Record, Outcome::Empty)
            .with("0xB", Outcome::Record, Outcome::Record);

        let results = run(&explorer, Duration::ZERO, &["0xC", "0xA", "0xB"]);
        let keys: Vec<&str> = results.keys().map(String::as_str).collect();

        assert_eq!(keys, ["0xC", "0xA", "0xB"]);
    }

    #[test]
    fn run_sleeps_after_every_contract() {
        let explorer = FakeExplorer::default()
            .with("0xA", Outcome::Fail, Outcome::Empty)
            .with("0xB", Outcome::Empty, Outcome::Empty)
            .with("0xC", Outcome::Record, Outcome::Empty);

        let started = Instant::now();
        run(&explorer, Duration::from_millis(20), &["0xA", "0xB", "0xC"]);

        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn run_reports_progress() {
        let explorer = FakeExplorer::default()
            .with("0xA", Outcome::Record, Outcome::Record)
            .with("0xB", Outcome::Empty, Outcome::Empty)
            .with("0xC", Outcome::Record, Outcome::Fail);

        let mut progress = Vec::new();
        let results = Harvester::new(&explorer, Duration::ZERO)
            .run(&addresses(&["0xA", "0xB", "0xC"]), &mut progress)
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(
            String::from_utf8(progress).unwrap(),
            "Gathering contract information from the explorer...\n\
             \nProcessing contract 1/3: 0xA\n\
             Contract info retrieved\n\
             Token info retrieved: Dayana (T0xA)\n\
             \nProcessing contract 2/3: 0xB\n\
             Failed to get contract info\n\
             \nProcessing contract 3/3: 0xC\n\
             Contract info retrieved\n"
        );
    }

    #[test]
    fn save_round_trip() {
        let mut results = ResultSet::new();
        results.insert("0xB".to_string(), ContractInfo::new(contract_record("0xB", "Pool")));
        results.insert(
            "0xA".to_string(),
            ContractInfo {
                contract: contract_record("0xA", "Dayana"),
                token: Some(TokenRecord::new("Dayana".into(), "DAYA".into(), "18".into(), "1000".into())),
            },
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contracts_info.json");
        std::fs::write(&path, "x".repeat(64 * 1024)).unwrap();

        save(&results, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert!(content.starts_with("{\n  \"0xB\": {\n    \"address\": \"0xB\",\n    \"contract_name\": \"Pool\","));
        assert_eq!(serde_json::from_str::<ResultSet>(&content).unwrap(), results);

        let keys: Vec<String> = serde_json::from_str::<ResultSet>(&content).unwrap().into_keys().collect();
        assert_eq!(keys, ["0xB", "0xA"]);
    }

    #[test]
    fn save_invalid_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("contracts_info.json");

        assert!(matches!(save(&ResultSet::new(), &path), Err(Error::OutputWrite(..))));
    }

    #[test]
    fn summary_lines() {
        let mut results = ResultSet::new();
        results.insert(
            "0xA".to_string(),
            ContractInfo {
                contract: contract_record("0xA", "Dayana"),
                token: Some(TokenRecord::new("Dayana".into(), "DAYA".into(), "18".into(), "1000".into())),
            },
        );
        results.insert("0xB".to_string(), ContractInfo::new(contract_record("0xB", "Pool")));

        assert_eq!(
            summary(5, &results),
            "Summary:\n   Total contracts processed: 5\n   Successful retrievals: 2\n   - 0xA: Dayana (DAYA)\n   - 0xB: Pool (N/A)\n"
        );
    }
}
