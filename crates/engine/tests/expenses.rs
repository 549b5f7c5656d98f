use sea_orm::Database;

use engine::{
    Amount, Caller, Category, Engine, EngineError, ExpenseFilter, NewExpenseCmd, SortKey,
    UpdateExpenseCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> Engine {
    engine_in_zone(chrono_tz::UTC).await
}

async fn engine_in_zone(timezone: chrono_tz::Tz) -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .database(db)
        .timezone(timezone)
        .password_memory_kib(8)
        .password_iterations(1)
        .build()
        .await
        .unwrap()
}

async fn user(engine: &Engine, email: &str) -> Caller {
    engine
        .signup(Some(email), Some("secret"), Some("Test User"))
        .await
        .unwrap()
}

async fn add(
    engine: &Engine,
    caller: &Caller,
    name: &str,
    category: Category,
    amount: f64,
    date: &str,
) -> Uuid {
    engine
        .create_expense(caller, NewExpenseCmd::new(name, category, amount).date(date))
        .await
        .unwrap()
        .id
}

/// Food 10.00 (Jan 5), Food 5.50 (Jan 20), Transport 20.00 (Feb 1).
async fn three_expenses(engine: &Engine, caller: &Caller) -> [Uuid; 3] {
    [
        add(engine, caller, "Groceries", Category::Food, 10.0, "2024-01-05").await,
        add(engine, caller, "Lunch", Category::Food, 5.5, "2024-01-20").await,
        add(engine, caller, "Train", Category::Transport, 20.0, "2024-02-01").await,
    ]
}

#[tokio::test]
async fn create_then_get_returns_same_fields() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;

    let created = engine
        .create_expense(
            &alice,
            NewExpenseCmd::new("  Dinner ", Category::Food, 42.5)
                .description("with friends")
                .date("2024-03-10T19:30:00Z"),
        )
        .await
        .unwrap();

    assert_eq!(created.name, "Dinner");
    assert_eq!(created.amount, Amount::new(4250));
    assert_eq!(created.user_id, alice.id());
    assert_eq!(created.date.to_rfc3339(), "2024-03-10T19:30:00+00:00");

    let fetched = engine.expense(&alice, &created.id.to_string()).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.user_id, created.user_id);
    assert_eq!(fetched.name, created.name);
    assert_eq!(fetched.description.as_deref(), Some("with friends"));
    assert_eq!(fetched.category, Category::Food);
    assert_eq!(fetched.amount, created.amount);
    assert_eq!(fetched.date, created.date);
}

#[tokio::test]
async fn create_validates_before_writing() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;

    let missing_name = NewExpenseCmd {
        name: Some("   ".to_string()),
        ..NewExpenseCmd::new("x", Category::Food, 1.0)
    };
    let bad_category = NewExpenseCmd {
        category: Some("Groceries".to_string()),
        ..NewExpenseCmd::new("x", Category::Food, 1.0)
    };
    let missing_amount = NewExpenseCmd {
        amount: None,
        ..NewExpenseCmd::new("x", Category::Food, 1.0)
    };
    let bad_date = NewExpenseCmd::new("x", Category::Food, 1.0).date("yesterday");

    for cmd in [missing_name, bad_category, missing_amount, bad_date] {
        let err = engine.create_expense(&alice, cmd).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)), "{err:?}");
    }
    assert!(engine.list_expenses(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn owner_is_always_the_caller() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    let bob = user(&engine, "bob@example.com").await;

    let id = add(&engine, &bob, "Taxi", Category::Transport, 12.0, "2024-01-01").await;

    let expense = engine.expense(&bob, &id.to_string()).await.unwrap();
    assert_eq!(expense.user_id, bob.id());
    assert!(engine.list_expenses(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn other_users_records_are_not_found() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    let bob = user(&engine, "bob@example.com").await;
    let id = add(&engine, &alice, "Rent", Category::Bills, 800.0, "2024-01-01").await.to_string();

    let get = engine.expense(&bob, &id).await.unwrap_err();
    let update = engine
        .update_expense(
            &bob,
            &id,
            UpdateExpenseCmd {
                name: Some("Stolen".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    let delete = engine.delete_expense(&bob, &id).await.unwrap_err();

    for err in [get, update, delete] {
        assert!(matches!(err, EngineError::KeyNotFound(_)), "{err:?}");
    }

    let untouched = engine.expense(&alice, &id).await.unwrap();
    assert_eq!(untouched.name, "Rent");
}

#[tokio::test]
async fn malformed_id_is_invalid_not_missing() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;

    let err = engine.expense(&alice, "not-a-uuid").await.unwrap_err();
    assert_eq!(err, EngineError::InvalidId("Invalid expense ID format".to_string()));

    let err = engine.delete_expense(&alice, "42").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidId(_)));

    let missing = Uuid::new_v4().to_string();
    let err = engine.expense(&alice, &missing).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn update_changes_only_provided_fields() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    let created = engine
        .create_expense(
            &alice,
            NewExpenseCmd::new("Cinema", Category::Entertainment, 9.0)
                .description("late show")
                .date("2024-04-01"),
        )
        .await
        .unwrap();
    let id = created.id.to_string();

    let updated = engine
        .update_expense(
            &alice,
            &id,
            UpdateExpenseCmd {
                amount: Some(11.5),
                description: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.amount, Amount::new(1150));
    assert_eq!(updated.description, None);
    assert_eq!(updated.name, "Cinema");
    assert_eq!(updated.category, Category::Entertainment);
    assert_eq!(updated.date, created.date);
    assert_eq!(updated.created_at.timestamp(), created.created_at.timestamp());
    assert_eq!(updated.user_id, alice.id());
    assert!(updated.updated_at >= created.updated_at);

    let err = engine
        .update_expense(
            &alice,
            &id,
            UpdateExpenseCmd {
                name: Some("Theatre".to_string()),
                category: Some("Fun".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)));
    assert_eq!(engine.expense(&alice, &id).await.unwrap().name, "Cinema");
}

#[tokio::test]
async fn delete_removes_only_that_record() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    let [first, second, _] = three_expenses(&engine, &alice).await;

    engine.delete_expense(&alice, &first.to_string()).await.unwrap();

    let err = engine.expense(&alice, &first.to_string()).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert!(engine.expense(&alice, &second.to_string()).await.is_ok());
    assert_eq!(engine.list_expenses(&alice).await.unwrap().len(), 2);

    let err = engine.delete_expense(&alice, &first.to_string()).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn delete_all_reports_count_and_spares_others() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    let bob = user(&engine, "bob@example.com").await;
    three_expenses(&engine, &alice).await;
    add(&engine, &bob, "Books", Category::Shopping, 30.0, "2024-01-02").await;

    assert_eq!(engine.delete_all_expenses(&alice).await.unwrap(), 3);
    assert!(engine.list_expenses(&alice).await.unwrap().is_empty());
    assert_eq!(engine.list_expenses(&bob).await.unwrap().len(), 1);

    assert_eq!(engine.delete_all_expenses(&alice).await.unwrap(), 0);
}

#[tokio::test]
async fn list_is_newest_first_and_capped() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    for day in 1..=28 {
        for hour in [8, 20] {
            let date = format!("2024-02-{day:02}T{hour:02}:00:00Z");
            add(&engine, &alice, "Coffee", Category::Food, 2.0, &date).await;
        }
    }

    let listed = engine.list_expenses(&alice).await.unwrap();
    assert_eq!(listed.len(), 50);
    assert!(listed.windows(2).all(|pair| pair[0].date >= pair[1].date));
    assert_eq!(listed[0].date.to_rfc3339(), "2024-02-28T20:00:00+00:00");

    let everything = engine
        .list_user_expenses(&alice, &alice.id().to_string())
        .await
        .unwrap();
    assert_eq!(everything.len(), 56);
}

#[tokio::test]
async fn listing_another_users_expenses_is_forbidden() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    let bob = user(&engine, "bob@example.com").await;

    let err = engine
        .list_user_expenses(&alice, &bob.id().to_string())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Forbidden("Access denied".to_string()));

    let err = engine.list_user_expenses(&alice, "me").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidId(_)));
}

#[tokio::test]
async fn summary_groups_by_category() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    three_expenses(&engine, &alice).await;

    let summary = engine.summary(&alice).await.unwrap();

    assert_eq!(summary.categories.len(), 2);
    assert_eq!(summary.categories[0].category, Category::Transport);
    assert_eq!(summary.categories[0].total, Amount::new(2000));
    assert_eq!(summary.categories[0].count, 1);
    assert_eq!(summary.categories[1].category, Category::Food);
    assert_eq!(summary.categories[1].total, Amount::new(1550));
    assert_eq!(summary.categories[1].count, 2);
    assert_eq!(summary.total_amount, Amount::new(3550));
    assert_eq!(summary.expense_count, 3);

    let total: i64 = summary.categories.iter().map(|row| row.total.cents()).sum();
    let count: u64 = summary.categories.iter().map(|row| row.count).sum();
    assert_eq!(total, summary.total_amount.cents());
    assert_eq!(count, summary.expense_count);
}

#[tokio::test]
async fn summary_of_nothing_is_empty() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    let bob = user(&engine, "bob@example.com").await;
    three_expenses(&engine, &bob).await;

    let summary = engine.summary(&alice).await.unwrap();
    assert!(summary.categories.is_empty());
    assert_eq!(summary.total_amount, Amount::ZERO);
    assert_eq!(summary.expense_count, 0);
}

#[tokio::test]
async fn totals_beyond_the_cent_range_fail_cleanly() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    // 1025 x 9e15 cents exceeds i64::MAX.
    for _ in 0..1025 {
        add(&engine, &alice, "Yacht", Category::Shopping, 90_000_000_000_000.0, "2024-03-01").await;
    }

    let err = engine.summary(&alice).await.unwrap_err();
    assert!(matches!(err, EngineError::Internal(_)), "{err:?}");
    let err = engine.statistics(&alice).await.unwrap_err();
    assert!(matches!(err, EngineError::Internal(_)), "{err:?}");
}

#[tokio::test]
async fn statistics_bucket_by_month_and_category() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    three_expenses(&engine, &alice).await;
    add(&engine, &alice, "Bus", Category::Transport, 2.5, "2024-01-09").await;

    let stats = engine.statistics(&alice).await.unwrap();
    let rows: Vec<(i32, u32, Category, i64, u64)> = stats
        .iter()
        .map(|row| (row.year, row.month, row.category, row.total.cents(), row.count))
        .collect();

    assert_eq!(
        rows,
        vec![
            (2024, 2, Category::Transport, 2000, 1),
            (2024, 1, Category::Food, 1550, 2),
            (2024, 1, Category::Transport, 250, 1),
        ]
    );
}

#[tokio::test]
async fn filter_by_month_returns_newest_first() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    let [groceries, lunch, _] = three_expenses(&engine, &alice).await;

    let filter = ExpenseFilter::parse(None, Some("2024-01")).unwrap();
    let found = engine.filter_expenses(&alice, &filter).await.unwrap();

    let ids: Vec<Uuid> = found.iter().map(|expense| expense.id).collect();
    assert_eq!(ids, vec![lunch, groceries]);
}

#[tokio::test]
async fn filter_combines_category_and_month() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    three_expenses(&engine, &alice).await;
    add(&engine, &alice, "Bus", Category::Transport, 2.5, "2024-01-09").await;

    let filter = ExpenseFilter::parse(Some("Transport"), Some("2024-01")).unwrap();
    let found = engine.filter_expenses(&alice, &filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Bus");

    let everything = ExpenseFilter::parse(Some(""), None).unwrap();
    assert_eq!(engine.filter_expenses(&alice, &everything).await.unwrap().len(), 4);

    assert!(ExpenseFilter::parse(Some("Travel"), None).is_err());
    assert!(ExpenseFilter::parse(None, Some("2024-13")).is_err());
}

#[tokio::test]
async fn month_filter_includes_the_whole_last_day() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    add(&engine, &alice, "Late", Category::Other, 1.0, "2024-01-31T23:59:59Z").await;
    add(&engine, &alice, "Next", Category::Other, 1.0, "2024-02-01T00:00:00Z").await;
    add(&engine, &alice, "First", Category::Other, 1.0, "2024-01-01T00:00:00Z").await;

    let filter = ExpenseFilter::parse(None, Some("2024-01")).unwrap();
    let names: Vec<String> = engine
        .filter_expenses(&alice, &filter)
        .await
        .unwrap()
        .into_iter()
        .map(|expense| expense.name)
        .collect();
    assert_eq!(names, vec!["Late".to_string(), "First".to_string()]);
}

#[tokio::test]
async fn month_boundaries_follow_the_engine_time_zone() {
    let engine = engine_in_zone(chrono_tz::Europe::Rome).await;
    let alice = user(&engine, "alice@example.com").await;
    // 00:30 in Rome on Feb 1st is still January in UTC.
    add(&engine, &alice, "Midnight snack", Category::Food, 4.0, "2024-02-01T00:30:00+01:00").await;
    add(&engine, &alice, "Plain date", Category::Food, 3.0, "2024-02-01").await;

    let january = ExpenseFilter::parse(None, Some("2024-01")).unwrap();
    let february = ExpenseFilter::parse(None, Some("2024-02")).unwrap();
    assert!(engine.filter_expenses(&alice, &january).await.unwrap().is_empty());
    assert_eq!(engine.filter_expenses(&alice, &february).await.unwrap().len(), 2);

    let stats = engine.statistics(&alice).await.unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!((stats[0].year, stats[0].month, stats[0].count), (2024, 2, 2));
}

#[tokio::test]
async fn search_matches_name_or_description_ignoring_case() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    engine
        .create_expense(
            &alice,
            NewExpenseCmd::new("Pizza", Category::Food, 12.0)
                .description("Friday night")
                .date("2024-01-05"),
        )
        .await
        .unwrap();
    add(&engine, &alice, "Night bus", Category::Transport, 2.0, "2024-01-06").await;
    add(&engine, &alice, "Groceries", Category::Food, 30.0, "2024-01-07").await;

    let found = engine.search_expenses(&alice, Some("NIGHT")).await.unwrap();
    let names: Vec<&str> = found.iter().map(|expense| expense.name.as_str()).collect();
    assert_eq!(names, vec!["Night bus", "Pizza"]);

    let none = engine.search_expenses(&alice, Some("sushi")).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn search_folds_non_ascii_letters() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    let id = engine
        .create_expense(
            &alice,
            NewExpenseCmd::new("CAFÉ CRÈME", Category::Food, 3.0)
                .description("Petit Déjeuner")
                .date("2024-01-05"),
        )
        .await
        .unwrap()
        .id;

    for keyword in ["crème", "CRÈME", "Café", "déjeuner", "DÉJEUNER"] {
        let hits = engine.search_expenses(&alice, Some(keyword)).await.unwrap();
        assert_eq!(hits.len(), 1, "{keyword}");
    }

    engine
        .update_expense(
            &alice,
            &id.to_string(),
            UpdateExpenseCmd {
                name: Some("Ça Va".to_string()),
                description: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let hits = engine.search_expenses(&alice, Some("ÇA")).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert!(engine.search_expenses(&alice, Some("crème")).await.unwrap().is_empty());
    assert!(engine.search_expenses(&alice, Some("déjeuner")).await.unwrap().is_empty());
}

#[tokio::test]
async fn search_keyword_is_literal() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    add(&engine, &alice, "Discount 50% off", Category::Shopping, 10.0, "2024-01-05").await;
    add(&engine, &alice, "Shoes", Category::Shopping, 60.0, "2024-01-06").await;

    let found = engine.search_expenses(&alice, Some("%")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Discount 50% off");

    let found = engine.search_expenses(&alice, Some("s_o")).await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn search_requires_a_keyword() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;

    for keyword in [None, Some(""), Some("   ")] {
        let err = engine.search_expenses(&alice, keyword).await.unwrap_err();
        assert_eq!(err, EngineError::InvalidRequest("Keyword required".to_string()));
    }
}

#[tokio::test]
async fn unknown_sort_key_sorts_by_date() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    three_expenses(&engine, &alice).await;

    let by_date = engine.sort_expenses(&alice, SortKey::Date).await.unwrap();
    let bogus = engine
        .sort_expenses(&alice, SortKey::parse_or_default(Some("bogus")))
        .await
        .unwrap();
    assert_eq!(by_date, bogus);
    assert_eq!(by_date[0].name, "Train");
}

#[tokio::test]
async fn sort_by_amount_and_name() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;
    three_expenses(&engine, &alice).await;

    let names = |expenses: Vec<engine::Expense>| -> Vec<String> {
        expenses.into_iter().map(|expense| expense.name).collect()
    };

    let by_amount = engine.sort_expenses(&alice, SortKey::Amount).await.unwrap();
    assert_eq!(names(by_amount), vec!["Train", "Groceries", "Lunch"]);

    let by_name = engine.sort_expenses(&alice, SortKey::Name).await.unwrap();
    assert_eq!(names(by_name), vec!["Groceries", "Lunch", "Train"]);

    let by_category = engine.sort_expenses(&alice, SortKey::Category).await.unwrap();
    assert_eq!(names(by_category), vec!["Lunch", "Groceries", "Train"]);
}

#[tokio::test]
async fn signup_rejects_duplicate_email() {
    let engine = engine_with_db().await;
    user(&engine, "alice@example.com").await;

    let err = engine
        .signup(Some("  Alice@Example.com "), Some("other"), Some("Alice"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("User already exists".to_string()));
}

#[tokio::test]
async fn signup_requires_every_field() {
    let engine = engine_with_db().await;

    for (email, password, name) in [
        (None, Some("pw"), Some("A")),
        (Some("a@example.com"), None, Some("A")),
        (Some("a@example.com"), Some(""), Some("A")),
        (Some("a@example.com"), Some("pw"), Some(" ")),
        (Some("not-an-email"), Some("pw"), Some("A")),
    ] {
        let err = engine.signup(email, password, name).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)), "{err:?}");
    }
}

#[tokio::test]
async fn login_checks_password() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;

    let again = engine
        .login(Some("ALICE@example.com"), Some("secret"))
        .await
        .unwrap();
    assert_eq!(again.id(), alice.id());
    assert_eq!(again.user().name, "Test User");

    let wrong = engine.login(Some("alice@example.com"), Some("Secret")).await;
    let unknown = engine.login(Some("carol@example.com"), Some("secret")).await;
    assert_eq!(wrong.unwrap_err(), EngineError::InvalidCredentials);
    assert_eq!(unknown.unwrap_err(), EngineError::InvalidCredentials);
}

#[tokio::test]
async fn caller_resolves_known_users_only() {
    let engine = engine_with_db().await;
    let alice = user(&engine, "alice@example.com").await;

    let resolved = engine.caller(alice.id()).await.unwrap();
    assert_eq!(resolved.id(), alice.id());
    assert_eq!(resolved.user().email, "alice@example.com");
    let err = engine.caller(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn unusable_password_cost_is_rejected_at_build() {
    let err = Engine::builder()
        .password_memory_kib(8)
        .password_iterations(0)
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)), "{err:?}");
}
