//! Integration tests for the ledger engine over the in-memory store.
//!
//! Exercises the full path: chart of accounts -> draft -> post -> reports,
//! including atomicity under failure and serializability under concurrent
//! postings.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::NaiveDate;

    use bahikhata_accounting::{
        AccountType, ChartOfAccounts, DateRange, EntryStatus, JournalEngine, JournalLine,
        LedgerError, LedgerStore, NewAccount, NewEntry,
    };
    use bahikhata_core::{AccountCode, EntryNumber, Money};

    use crate::store::InMemoryLedgerStore;

    type Chart = ChartOfAccounts<Arc<InMemoryLedgerStore>>;
    type Engine = JournalEngine<Arc<InMemoryLedgerStore>>;

    fn code(s: &str) -> AccountCode {
        AccountCode::new(s).unwrap()
    }

    fn number(s: &str) -> EntryNumber {
        EntryNumber::new(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn setup() -> (Arc<InMemoryLedgerStore>, Chart, Engine) {
        let store = Arc::new(InMemoryLedgerStore::new());
        (
            store.clone(),
            ChartOfAccounts::new(store.clone()),
            JournalEngine::new(store),
        )
    }

    fn create_account(chart: &Chart, c: &str, account_type: AccountType, opening: i64) {
        chart
            .create_account(NewAccount {
                code: code(c),
                name: c.to_string(),
                account_type,
                parent_code: None,
                opening_balance: Money::from_minor(opening),
                description: None,
            })
            .unwrap();
    }

    fn post_entry(engine: &Engine, n: &str, d: &str, lines: Vec<JournalLine>) {
        engine
            .create_draft(NewEntry {
                entry_number: number(n),
                date: date(d),
                description: format!("entry {n}"),
                lines,
            })
            .unwrap();
        engine.post(&number(n)).unwrap();
    }

    fn balance(store: &InMemoryLedgerStore, c: &str) -> i64 {
        store
            .load_account(&code(c))
            .unwrap()
            .unwrap()
            .current_balance
            .minor()
    }

    #[test]
    fn sale_posting_and_reversal_round_trip() {
        let (store, chart, engine) = setup();
        create_account(&chart, "1111", AccountType::Asset, 50_000);
        create_account(&chart, "4101", AccountType::Revenue, 0);

        post_entry(
            &engine,
            "JV-1",
            "2024-04-01",
            vec![
                JournalLine::debit(code("1111"), Money::from_minor(1_000)),
                JournalLine::credit(code("4101"), Money::from_minor(1_000)),
            ],
        );
        assert_eq!(balance(&store, "1111"), 51_000);
        assert_eq!(balance(&store, "4101"), 1_000);

        let reversing = engine.reverse(&number("JV-1")).unwrap();
        assert_eq!(reversing.status, EntryStatus::Posted);
        assert_eq!(balance(&store, "1111"), 50_000);
        assert_eq!(balance(&store, "4101"), 0);
        assert_eq!(
            engine.get_entry(&number("JV-1")).unwrap().status,
            EntryStatus::Reversed
        );
    }

    #[test]
    fn trial_balance_columns_agree_after_arbitrary_postings() {
        let (_, chart, engine) = setup();
        create_account(&chart, "1111", AccountType::Asset, 0);
        create_account(&chart, "2101", AccountType::Liability, 0);
        create_account(&chart, "3101", AccountType::Equity, 0);
        create_account(&chart, "4101", AccountType::Revenue, 0);
        create_account(&chart, "5101", AccountType::Expense, 0);

        // Seed capital, a sale, and an expense.
        post_entry(
            &engine,
            "JV-1",
            "2024-04-01",
            vec![
                JournalLine::debit(code("1111"), Money::from_minor(100_000)),
                JournalLine::credit(code("3101"), Money::from_minor(100_000)),
            ],
        );
        post_entry(
            &engine,
            "JV-2",
            "2024-04-10",
            vec![
                JournalLine::debit(code("1111"), Money::from_minor(25_000)),
                JournalLine::credit(code("4101"), Money::from_minor(25_000)),
            ],
        );
        post_entry(
            &engine,
            "JV-3",
            "2024-04-20",
            vec![
                JournalLine::debit(code("5101"), Money::from_minor(7_000)),
                JournalLine::credit(code("2101"), Money::from_minor(7_000)),
            ],
        );

        let rows = engine.get_trial_balance(None).unwrap();
        let total_debit: i128 = rows.iter().map(|r| r.debit).sum();
        let total_credit: i128 = rows.iter().map(|r| r.credit).sum();
        assert_eq!(total_debit, total_credit);
        assert_eq!(total_debit, 132_000);
    }

    #[test]
    fn trial_balance_as_of_replays_history() {
        let (_, chart, engine) = setup();
        create_account(&chart, "1111", AccountType::Asset, 10_000);
        create_account(&chart, "4101", AccountType::Revenue, 0);

        post_entry(
            &engine,
            "JV-1",
            "2024-04-05",
            vec![
                JournalLine::debit(code("1111"), Money::from_minor(2_000)),
                JournalLine::credit(code("4101"), Money::from_minor(2_000)),
            ],
        );
        post_entry(
            &engine,
            "JV-2",
            "2024-05-05",
            vec![
                JournalLine::debit(code("1111"), Money::from_minor(3_000)),
                JournalLine::credit(code("4101"), Money::from_minor(3_000)),
            ],
        );

        let find = |rows: &[bahikhata_accounting::TrialBalanceRow], c: &str| -> i64 {
            rows.iter()
                .find(|r| r.account_code.as_str() == c)
                .map(|r| r.debit.minor() - r.credit.minor())
                .unwrap()
        };

        let april = engine.get_trial_balance(Some(date("2024-04-30"))).unwrap();
        assert_eq!(find(&april, "1111"), 12_000);
        assert_eq!(find(&april, "4101"), -2_000);

        let may = engine.get_trial_balance(Some(date("2024-05-31"))).unwrap();
        assert_eq!(find(&may, "1111"), 15_000);
    }

    #[test]
    fn statement_orders_lines_and_tracks_running_balance() {
        let (_, chart, engine) = setup();
        create_account(&chart, "1111", AccountType::Asset, 5_000);
        create_account(&chart, "4101", AccountType::Revenue, 0);

        // Posted out of date order on purpose.
        post_entry(
            &engine,
            "JV-2",
            "2024-04-15",
            vec![
                JournalLine::debit(code("1111"), Money::from_minor(400)),
                JournalLine::credit(code("4101"), Money::from_minor(400)),
            ],
        );
        post_entry(
            &engine,
            "JV-1",
            "2024-04-10",
            vec![
                JournalLine::debit(code("1111"), Money::from_minor(300)),
                JournalLine::credit(code("4101"), Money::from_minor(300)),
            ],
        );
        post_entry(
            &engine,
            "JV-3",
            "2024-03-01",
            vec![
                JournalLine::debit(code("1111"), Money::from_minor(100)),
                JournalLine::credit(code("4101"), Money::from_minor(100)),
            ],
        );

        let statement = engine
            .get_account_statement(
                &code("1111"),
                DateRange {
                    from: Some(date("2024-04-01")),
                    to: Some(date("2024-04-30")),
                },
            )
            .unwrap();

        // March activity folds into the range's opening balance.
        assert_eq!(statement.opening_balance, Money::from_minor(5_100));
        let numbers: Vec<&str> = statement
            .lines
            .iter()
            .map(|l| l.entry_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["JV-1", "JV-2"]);
        assert_eq!(statement.lines[0].running_balance, Money::from_minor(5_400));
        assert_eq!(statement.lines[1].running_balance, Money::from_minor(5_800));
        assert_eq!(statement.closing_balance, Money::from_minor(5_800));
    }

    #[test]
    fn concurrent_postings_on_shared_accounts_lose_no_updates() {
        let (store, chart, engine) = setup();
        create_account(&chart, "1111", AccountType::Asset, 0);
        create_account(&chart, "4101", AccountType::Revenue, 0);

        let threads = 8;
        let per_thread = 25;
        for t in 0..threads {
            for i in 0..per_thread {
                engine
                    .create_draft(NewEntry {
                        entry_number: number(&format!("JV-{t}-{i}")),
                        date: date("2024-04-01"),
                        description: String::new(),
                        lines: vec![
                            JournalLine::debit(code("1111"), Money::from_minor(10)),
                            JournalLine::credit(code("4101"), Money::from_minor(10)),
                        ],
                    })
                    .unwrap();
            }
        }

        let engine = Arc::new(engine);
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let engine = engine.clone();
                thread::spawn(move || {
                    for i in 0..per_thread {
                        engine.post(&number(&format!("JV-{t}-{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let expected = (threads * per_thread * 10) as i64;
        assert_eq!(balance(&store, "1111"), expected);
        assert_eq!(balance(&store, "4101"), expected);
    }

    #[test]
    fn concurrent_double_post_applies_exactly_once() {
        let (store, chart, engine) = setup();
        create_account(&chart, "1111", AccountType::Asset, 0);
        create_account(&chart, "4101", AccountType::Revenue, 0);

        engine
            .create_draft(NewEntry {
                entry_number: number("JV-1"),
                date: date("2024-04-01"),
                description: String::new(),
                lines: vec![
                    JournalLine::debit(code("1111"), Money::from_minor(500)),
                    JournalLine::credit(code("4101"), Money::from_minor(500)),
                ],
            })
            .unwrap();

        let engine = Arc::new(engine);
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let engine = engine.clone();
                thread::spawn(move || engine.post(&number("JV-1")))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(LedgerError::AlreadyPosted(_)))));
        assert_eq!(balance(&store, "1111"), 500);
    }

    #[test]
    fn reports_over_reversed_entries_stay_consistent() {
        let (_, chart, engine) = setup();
        create_account(&chart, "1111", AccountType::Asset, 0);
        create_account(&chart, "4101", AccountType::Revenue, 0);

        post_entry(
            &engine,
            "JV-1",
            "2024-04-01",
            vec![
                JournalLine::debit(code("1111"), Money::from_minor(900)),
                JournalLine::credit(code("4101"), Money::from_minor(900)),
            ],
        );
        engine.reverse(&number("JV-1")).unwrap();

        let rows = engine.get_trial_balance(None).unwrap();
        let total_debit: i128 = rows.iter().map(|r| r.debit).sum();
        let total_credit: i128 = rows.iter().map(|r| r.credit).sum();
        assert_eq!(total_debit, 0);
        assert_eq!(total_credit, 0);

        // The statement shows both the original and the reversing line.
        let statement = engine
            .get_account_statement(&code("1111"), DateRange::default())
            .unwrap();
        assert_eq!(statement.lines.len(), 2);
        assert_eq!(statement.closing_balance, Money::ZERO);
    }
}
