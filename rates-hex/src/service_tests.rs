//! ExchangeRateService and RateSynchronizer unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::{BTreeMap, HashMap, HashSet};
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use rates_types::{
        AppError, ConversionRequest, CurrencyCode, CurrencyRates, ExchangeRateRepository,
        ExchangeRates, FetchRange, FixedClock, RateSource, RepoError, SourceError,
        SupportedCurrencies,
    };

    use crate::{ExchangeRateService, RateSynchronizer, SyncError, SyncOutcome};

    /// Simple in-memory repository for testing the service layer.
    pub struct MockRepo {
        rows: Mutex<HashMap<NaiveDate, ExchangeRates>>,
        broken: AtomicBool,
    }

    impl MockRepo {
        pub fn new() -> Self {
            Self {
                rows: Mutex::new(HashMap::new()),
                broken: AtomicBool::new(false),
            }
        }

        pub fn with_rows(rows: impl IntoIterator<Item = ExchangeRates>) -> Self {
            let repo = Self::new();
            for row in rows {
                repo.rows.lock().unwrap().insert(row.date, row);
            }
            repo
        }

        /// Makes every subsequent call fail with a database error.
        pub fn break_storage(&self) {
            self.broken.store(true, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), RepoError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(RepoError::Database("connection refused".into()));
            }
            Ok(())
        }

        pub fn dates(&self) -> Vec<NaiveDate> {
            let mut dates: Vec<_> = self.rows.lock().unwrap().keys().copied().collect();
            dates.sort();
            dates
        }

        pub fn row(&self, date: NaiveDate) -> Option<ExchangeRates> {
            self.rows.lock().unwrap().get(&date).cloned()
        }
    }

    #[async_trait]
    impl ExchangeRateRepository for MockRepo {
        async fn find_by_date(&self, date: NaiveDate) -> Result<Option<ExchangeRates>, RepoError> {
            self.check()?;
            Ok(self.rows.lock().unwrap().get(&date).cloned())
        }

        async fn find_all_ordered_by_date(&self) -> Result<Vec<ExchangeRates>, RepoError> {
            self.check()?;
            let mut rows: Vec<_> = self.rows.lock().unwrap().values().cloned().collect();
            rows.sort_by_key(|r| r.date);
            Ok(rows)
        }

        async fn exists_by_date(&self, date: NaiveDate) -> Result<bool, RepoError> {
            self.check()?;
            Ok(self.rows.lock().unwrap().contains_key(&date))
        }

        async fn count(&self) -> Result<i64, RepoError> {
            self.check()?;
            Ok(self.rows.lock().unwrap().len() as i64)
        }

        async fn save(&self, rates: ExchangeRates) -> Result<bool, RepoError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            if rows.contains_key(&rates.date) {
                return Ok(false);
            }
            rows.insert(rates.date, rates);
            Ok(true)
        }
    }

    /// Canned per-currency responses; records every request.
    pub struct MockSource {
        rates: HashMap<CurrencyCode, CurrencyRates>,
        failing: HashSet<CurrencyCode>,
        calls: Mutex<Vec<(CurrencyCode, FetchRange)>>,
    }

    impl MockSource {
        pub fn new() -> Self {
            Self {
                rates: HashMap::new(),
                failing: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with(mut self, currency: &str, rates: &[(NaiveDate, Decimal)]) -> Self {
            self.rates
                .insert(code(currency), rates.iter().copied().collect());
            self
        }

        pub fn failing(mut self, currency: &str) -> Self {
            self.failing.insert(code(currency));
            self
        }

        pub fn calls(&self) -> Vec<(CurrencyCode, FetchRange)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RateSource for MockSource {
        async fn fetch_rates(
            &self,
            currency: &CurrencyCode,
            range: FetchRange,
        ) -> Result<CurrencyRates, SourceError> {
            self.calls.lock().unwrap().push((currency.clone(), range));
            if self.failing.contains(currency) {
                return Err(SourceError::Status {
                    status: 503,
                    body: "Service Unavailable".into(),
                });
            }
            let all = self.rates.get(currency).cloned().unwrap_or_default();
            Ok(match range {
                FetchRange::FullHistory => all,
                FetchRange::Between { start, end } => all
                    .into_iter()
                    .filter(|(d, _)| *d >= start && *d <= end)
                    .collect(),
            })
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    fn row(day: &str, rates: &[(&str, Decimal)]) -> ExchangeRates {
        let rates: BTreeMap<_, _> = rates.iter().map(|(c, r)| (code(c), *r)).collect();
        ExchangeRates::new(date(day), rates)
    }

    fn currencies(list: &str) -> SupportedCurrencies {
        SupportedCurrencies::parse_list(list).unwrap()
    }

    fn service(repo: MockRepo, today: &str) -> ExchangeRateService<MockRepo> {
        ExchangeRateService::new(
            Arc::new(repo),
            currencies("USD,GBP,JPY"),
            Arc::new(FixedClock(date(today))),
        )
    }

    fn synchronizer(
        repo: Arc<MockRepo>,
        source: MockSource,
        list: &str,
        today: &str,
    ) -> (RateSynchronizer<MockRepo, MockSource>, Arc<MockSource>) {
        let source = Arc::new(source);
        let sync = RateSynchronizer::new(
            repo,
            source.clone(),
            currencies(list),
            Arc::new(FixedClock(date(today))),
        );
        (sync, source)
    }

    fn convert_req(currency: &str, amount: Decimal, day: &str) -> ConversionRequest {
        ConversionRequest {
            currency: currency.into(),
            amount,
            date: date(day),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_available_currencies() {
        let service = service(MockRepo::new(), "2024-01-10");

        let codes: Vec<_> = service
            .available_currencies()
            .iter()
            .map(|c| c.to_string())
            .collect();

        assert_eq!(codes, vec!["USD", "GBP", "JPY"]);
    }

    #[tokio::test]
    async fn test_all_exchange_rates_sorted() {
        let repo = MockRepo::with_rows([
            row("2024-01-03", &[("USD", dec!(1.0919))]),
            row("2024-01-02", &[("USD", dec!(1.0956))]),
        ]);
        let service = service(repo, "2024-01-10");

        let rows = service.all_exchange_rates().await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date("2024-01-02"));
        assert_eq!(rows[1].rate(&code("USD")), Some(dec!(1.0919)));
    }

    #[tokio::test]
    async fn test_exchange_rates_missing_date() {
        let service = service(MockRepo::new(), "2024-01-10");

        let result = service.exchange_rates(date("2024-01-02")).await;

        assert!(matches!(result, Err(AppError::DateNotFound(d)) if d == date("2024-01-02")));
    }

    #[tokio::test]
    async fn test_exchange_rate_case_insensitive() {
        let repo = MockRepo::with_rows([row("2024-01-02", &[("USD", dec!(1.0956))])]);
        let service = service(repo, "2024-01-10");

        let rate = service
            .exchange_rate(date("2024-01-02"), "usd")
            .await
            .unwrap();

        assert_eq!(rate, dec!(1.0956));
    }

    #[tokio::test]
    async fn test_exchange_rate_distinguishes_missing_date_and_currency() {
        let repo = MockRepo::with_rows([row("2024-01-02", &[("USD", dec!(1.0956))])]);
        let service = service(repo, "2024-01-10");

        let missing_date = service.exchange_rate(date("2024-01-03"), "USD").await;
        let missing_rate = service.exchange_rate(date("2024-01-02"), "GBP").await;

        assert!(matches!(missing_date, Err(AppError::DateNotFound(_))));
        assert!(matches!(missing_rate, Err(AppError::RateNotFound { .. })));
    }

    #[tokio::test]
    async fn test_exchange_rate_rejects_bad_codes() {
        let service = service(MockRepo::new(), "2024-01-10");

        let malformed = service.exchange_rate(date("2024-01-02"), "US").await;
        let unsupported = service.exchange_rate(date("2024-01-02"), "XYZ").await;

        assert!(matches!(malformed, Err(AppError::BadRequest(_))));
        assert!(matches!(unsupported, Err(AppError::UnsupportedCurrency(_))));
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal() {
        let repo = MockRepo::new();
        repo.break_storage();
        let service = service(repo, "2024-01-10");

        let result = service.all_exchange_rates().await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_convert_usd() {
        let repo = MockRepo::with_rows([row("2024-01-02", &[("USD", dec!(1.1000))])]);
        let service = service(repo, "2024-01-10");

        let result = service
            .convert_to_eur(convert_req("USD", dec!(110.00), "2024-01-02"))
            .await
            .unwrap();

        assert_eq!(result.converted_amount, dec!(100.0000));
        assert_eq!(result.converted_amount.to_string(), "100.0000");
        assert_eq!(result.rate, dec!(1.1000));
        assert_eq!(result.from_currency, code("USD"));
        assert_eq!(
            result.formatted_result,
            "110.00 USD on 2024-01-02 = 100.0000 EUR"
        );
    }

    #[tokio::test]
    async fn test_convert_rounds_inverse_rate_half_up() {
        // 1 / 155.73 = 0.0064213703... -> 0.006421
        let repo = MockRepo::with_rows([row("2024-01-02", &[("JPY", dec!(155.73))])]);
        let service = service(repo, "2024-01-10");

        let result = service
            .convert_to_eur(convert_req("jpy", dec!(1000), "2024-01-02"))
            .await
            .unwrap();

        assert_eq!(result.converted_amount, dec!(6.4210));
    }

    #[tokio::test]
    async fn test_convert_zero_rate() {
        let repo = MockRepo::with_rows([row("2024-01-02", &[("USD", dec!(0))])]);
        let service = service(repo, "2024-01-10");

        let result = service
            .convert_to_eur(convert_req("USD", dec!(10), "2024-01-02"))
            .await;

        assert!(matches!(result, Err(AppError::ZeroRate { .. })));
    }

    #[tokio::test]
    async fn test_convert_unsupported_currency_checked_before_lookup() {
        let service = service(MockRepo::new(), "2024-01-10");

        let result = service
            .convert_to_eur(convert_req("XYZ", dec!(10), "2024-01-02"))
            .await;

        assert!(matches!(result, Err(AppError::UnsupportedCurrency(c)) if c == "XYZ"));
    }

    #[tokio::test]
    async fn test_convert_validates_amount() {
        let repo = MockRepo::with_rows([row("2024-01-02", &[("USD", dec!(1.1))])]);
        let service = service(repo, "2024-01-10");

        for amount in [dec!(0), dec!(-5), dec!(1.234), dec!(12345678901)] {
            let result = service
                .convert_to_eur(convert_req("USD", amount, "2024-01-02"))
                .await;
            assert!(
                matches!(result, Err(AppError::BadRequest(_))),
                "amount {amount} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_convert_rejects_future_date() {
        let service = service(MockRepo::new(), "2024-01-10");

        let result = service
            .convert_to_eur(convert_req("USD", dec!(10), "2024-01-11"))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_convert_missing_date_and_missing_rate() {
        let repo = MockRepo::with_rows([row("2024-01-02", &[("USD", dec!(1.1))])]);
        let service = service(repo, "2024-01-10");

        let no_date = service
            .convert_to_eur(convert_req("USD", dec!(10), "2024-01-05"))
            .await;
        let no_rate = service
            .convert_to_eur(convert_req("GBP", dec!(10), "2024-01-02"))
            .await;

        assert!(matches!(no_date, Err(AppError::DateNotFound(_))));
        assert!(matches!(no_rate, Err(AppError::RateNotFound { .. })));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Synchronizer
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_backfill_merges_all_currencies() {
        let repo = Arc::new(MockRepo::new());
        let source = MockSource::new()
            .with(
                "USD",
                &[(date("2024-01-02"), dec!(1.0956)), (date("2024-01-03"), dec!(1.0919))],
            )
            .with("GBP", &[(date("2024-01-02"), dec!(0.86))]);
        let (sync, source) = synchronizer(repo.clone(), source, "USD,GBP", "2024-01-10");

        let outcome = sync.import_all_historical_data().await.unwrap();

        let SyncOutcome::Completed(report) = outcome else {
            panic!("expected a completed run");
        };
        assert_eq!(report.dates_received, 2);
        assert_eq!(report.rows_written, 2);
        assert!(report.failed_currencies.is_empty());
        assert_eq!(repo.dates(), vec![date("2024-01-02"), date("2024-01-03")]);

        let first = repo.row(date("2024-01-02")).unwrap();
        assert_eq!(first.rate(&code("GBP")), Some(dec!(0.86)));
        let second = repo.row(date("2024-01-03")).unwrap();
        assert_eq!(second.rate(&code("GBP")), None);

        assert!(source
            .calls()
            .iter()
            .all(|(_, range)| *range == FetchRange::FullHistory));
    }

    #[tokio::test]
    async fn test_backfill_skips_populated_storage() {
        let repo = Arc::new(MockRepo::with_rows([row("2024-01-02", &[("USD", dec!(1.1))])]));
        let source = MockSource::new().with("USD", &[(date("2024-01-03"), dec!(1.2))]);
        let (sync, source) = synchronizer(repo.clone(), source, "USD", "2024-01-10");

        let outcome = sync.import_all_historical_data().await.unwrap();

        assert_eq!(outcome, SyncOutcome::Skipped);
        assert!(source.calls().is_empty());
        assert_eq!(repo.dates(), vec![date("2024-01-02")]);
    }

    #[tokio::test]
    async fn test_backfill_partial_failure_writes_others() {
        let repo = Arc::new(MockRepo::new());
        let source = MockSource::new()
            .with("USD", &[(date("2024-01-02"), dec!(1.0956))])
            .failing("GBP");
        let (sync, _) = synchronizer(repo.clone(), source, "USD,GBP", "2024-01-10");

        let SyncOutcome::Completed(report) = sync.import_all_historical_data().await.unwrap()
        else {
            panic!("expected a completed run");
        };

        assert_eq!(report.failed_currencies, vec![code("GBP")]);
        assert_eq!(report.rows_written, 1);
        let stored = repo.row(date("2024-01-02")).unwrap();
        assert_eq!(stored.rates.len(), 1);
    }

    #[tokio::test]
    async fn test_backfill_aborts_when_every_currency_fails() {
        let repo = Arc::new(MockRepo::new());
        let source = MockSource::new().failing("USD").failing("GBP");
        let (sync, _) = synchronizer(repo.clone(), source, "USD,GBP", "2024-01-10");

        let result = sync.import_all_historical_data().await;

        assert!(matches!(
            result,
            Err(SyncError::AllSourcesFailed { attempted: 2 })
        ));
        assert!(repo.dates().is_empty());
    }

    #[tokio::test]
    async fn test_backfill_storage_error() {
        let repo = Arc::new(MockRepo::new());
        repo.break_storage();
        let (sync, _) = synchronizer(repo, MockSource::new(), "USD", "2024-01-10");

        let result = sync.import_all_historical_data().await;

        assert!(matches!(result, Err(SyncError::Storage(_))));
    }

    #[tokio::test]
    async fn test_top_up_writes_today() {
        let repo = Arc::new(MockRepo::new());
        let source = MockSource::new()
            .with("USD", &[(date("2024-01-09"), dec!(1.09)), (date("2024-01-10"), dec!(1.10))]);
        let (sync, source) = synchronizer(repo.clone(), source, "USD", "2024-01-10");

        let SyncOutcome::Completed(report) =
            sync.fetch_and_store_current_rates_if_missing().await.unwrap()
        else {
            panic!("expected a completed run");
        };

        assert_eq!(report.rows_written, 1);
        assert_eq!(repo.dates(), vec![date("2024-01-10")]);
        assert_eq!(
            source.calls(),
            vec![(code("USD"), FetchRange::single_day(date("2024-01-10")))]
        );
    }

    #[tokio::test]
    async fn test_top_up_noop_when_today_present() {
        let repo = Arc::new(MockRepo::with_rows([row("2024-01-10", &[("USD", dec!(1.1))])]));
        let source = MockSource::new().with("USD", &[(date("2024-01-10"), dec!(9.9))]);
        let (sync, source) = synchronizer(repo.clone(), source, "USD", "2024-01-10");

        let outcome = sync.fetch_and_store_current_rates_if_missing().await.unwrap();

        assert_eq!(outcome, SyncOutcome::Skipped);
        assert!(source.calls().is_empty());
        let stored = repo.row(date("2024-01-10")).unwrap();
        assert_eq!(stored.rate(&code("USD")), Some(dec!(1.1)));
    }

    /// A source that answers with the previous business day regardless of range.
    struct StaleSource;

    #[async_trait]
    impl RateSource for StaleSource {
        async fn fetch_rates(
            &self,
            _currency: &CurrencyCode,
            _range: FetchRange,
        ) -> Result<CurrencyRates, SourceError> {
            Ok([(date("2024-01-09"), dec!(1.09))].into_iter().collect())
        }
    }

    #[tokio::test]
    async fn test_top_up_prior_date_keeps_today_missing() {
        let repo = Arc::new(MockRepo::new());
        let sync = RateSynchronizer::new(
            repo.clone(),
            Arc::new(StaleSource),
            currencies("USD"),
            Arc::new(FixedClock(date("2024-01-10"))),
        );

        let first = sync.fetch_and_store_current_rates_if_missing().await.unwrap();
        let second = sync.fetch_and_store_current_rates_if_missing().await.unwrap();

        assert_eq!(repo.dates(), vec![date("2024-01-09")]);
        let SyncOutcome::Completed(first) = first else {
            panic!("expected a completed run");
        };
        assert_eq!(first.rows_written, 1);
        let SyncOutcome::Completed(second) = second else {
            panic!("expected the second run to fetch again");
        };
        assert_eq!(second.rows_written, 0);
        assert_eq!(second.rows_already_present, 1);
    }

    #[tokio::test]
    async fn test_top_up_nothing_published() {
        let repo = Arc::new(MockRepo::new());
        let (sync, _) = synchronizer(repo.clone(), MockSource::new(), "USD,GBP", "2024-01-13");

        let SyncOutcome::Completed(report) =
            sync.fetch_and_store_current_rates_if_missing().await.unwrap()
        else {
            panic!("expected a completed run");
        };

        assert_eq!(report.dates_received, 0);
        assert_eq!(report.rows_written, 0);
        assert!(repo.dates().is_empty());
    }
}
