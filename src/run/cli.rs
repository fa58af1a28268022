use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use finledger::budget::period_window;
use finledger::dates::{self, format_day, month_bounds, parse_day};
use finledger::models::{
    Account, AccountType, BudgetPeriod, Category, NewAccount, NewSavingsGoal, NewTransaction,
    Theme, TransactionPatch, TransactionType,
};
use finledger::query::{SortOrder, TransactionFilter};
use finledger::Database;

/// Flags that take no value.
const SWITCHES: &[&str] = &["--asc", "--check", "--clear-note"];

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    let Some(command) = args.get(1) else {
        print_usage();
        return Ok(());
    };
    let rest = &args[2..];
    match command.as_str() {
        "accounts" => cli_accounts(db),
        "account-add" => cli_account_add(rest, db),
        "account-rm" => cli_account_rm(rest, db),
        "categories" => cli_categories(rest, db),
        "add" => cli_add(rest, db),
        "edit" => cli_edit(rest, db),
        "rm" => cli_rm(rest, db),
        "list" | "ls" => cli_list(rest, db),
        "summary" | "s" => cli_summary(rest, db),
        "budget-set" => cli_budget_set(rest, db),
        "budgets" => cli_budgets(rest, db),
        "goals" => cli_goals(db),
        "goal-add" => cli_goal_add(rest, db),
        "goal-rm" => cli_goal_rm(rest, db),
        "reconcile" => cli_reconcile(rest, db),
        "settings" => cli_settings(rest, db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("finledger {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

/// Run the once-a-day goal recompute. A failure does not stop the command;
/// it comes back as a message to show the user.
pub(crate) fn refresh_goals(db: &Database, today: NaiveDate) -> Option<String> {
    match db.run_daily_goal_update(today) {
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "savings goal update failed");
            Some(format!("Warning: savings goals were not updated: {e}"))
        }
    }
}

fn print_usage() {
    println!("finledger - local personal finance ledger");
    println!();
    println!("Usage: finledger <command> [args]");
    println!();
    println!("Commands:");
    println!("  accounts                          List accounts and balances");
    println!("  account-add <name>                Add an account");
    println!("    --type <type> --initial <amt>");
    println!("  account-rm <account>              Delete an unused account");
    println!("  categories [income|expense]       List categories");
    println!("  add <income|expense> <amount> <category>");
    println!("    --account <a> --date <YYYY-MM-DD> --note <text>");
    println!("  edit <id>                         Edit a transaction");
    println!("    --type --amount --category --account --date --note --clear-note");
    println!("  rm <id>...                        Delete transactions");
    println!("  list                              List transactions, newest first");
    println!("    --type --category --account --from --to --limit --asc");
    println!("  summary [YYYY-MM]                 Monthly totals and balances");
    println!("  budget-set <amount>               Set a budget");
    println!("    --category <c> --period <monthly|yearly>");
    println!("  budgets [monthly|yearly]          Budget usage for the current period");
    println!("  goals                             Savings goals and projections");
    println!("  goal-add <name> <target>          Add a savings goal");
    println!("    --start <YYYY-MM-DD> --by <YYYY-MM-DD>");
    println!("  goal-rm <id>                      Delete a savings goal");
    println!("  reconcile [--check]               Audit and repair account balances");
    println!("  settings [theme|currency|default-account <value>]");
    println!("  --help, -h                        Show this help");
    println!("  --version, -V                     Show version");
    println!();
    println!("FINLEDGER_DB overrides the database path; RUST_LOG sets log level.");
}

// ── Argument helpers ──────────────────────────────────────────

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn switch(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// Arguments that are neither flags nor flag values.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            if !SWITCHES.contains(&arg.as_str()) {
                iter.next();
            }
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

fn parse_amount(s: &str) -> Result<Decimal> {
    Decimal::from_str(s.trim().trim_start_matches('$'))
        .with_context(|| format!("Invalid amount: {s}"))
}

fn parse_kind(s: &str) -> Result<TransactionType> {
    TransactionType::parse(s).ok_or_else(|| anyhow::anyhow!("Unknown transaction type: {s}"))
}

fn parse_period(s: &str) -> Result<BudgetPeriod> {
    BudgetPeriod::parse(s).ok_or_else(|| anyhow::anyhow!("Unknown budget period: {s}"))
}

fn checked_day(s: &str) -> Result<String> {
    Ok(format_day(parse_day(s)?))
}

fn resolve_account(db: &Database, key: &str) -> Result<Account> {
    let accounts = db.get_accounts()?;
    accounts
        .iter()
        .find(|a| a.id == key)
        .or_else(|| accounts.iter().find(|a| a.name.eq_ignore_ascii_case(key)))
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Account '{key}' not found"))
}

fn default_account(db: &Database) -> Result<Account> {
    if let Some(id) = db.get_settings().default_account_id {
        if let Some(account) = db.get_account_by_id(&id)? {
            return Ok(account);
        }
    }
    db.get_accounts()?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("No accounts found"))
}

fn resolve_category(categories: &[Category], key: &str) -> Result<Category> {
    Category::find_by_id(categories, key)
        .or_else(|| Category::find_by_name(categories, key))
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Category '{key}' not found"))
}

fn money(currency: &str, amount: Decimal) -> String {
    format!("{currency} {amount:.2}")
}

// ── Accounts and categories ───────────────────────────────────

fn cli_accounts(db: &mut Database) -> Result<()> {
    let settings = db.get_settings();
    let accounts = db.get_accounts()?;

    println!("  {:<20} {:<12} {:>14}  ID", "Name", "Type", "Balance");
    println!("{}", "─".repeat(72));
    for acct in &accounts {
        let marker = if settings.default_account_id.as_deref() == Some(acct.id.as_str()) {
            '*'
        } else {
            ' '
        };
        println!(
            "{marker} {:<20} {:<12} {:>14}  {}",
            acct.name,
            acct.account_type,
            money(&settings.currency, acct.balance()),
            acct.id,
        );
    }
    Ok(())
}

fn cli_account_add(args: &[String], db: &mut Database) -> Result<()> {
    let name = positionals(args).join(" ");
    if name.is_empty() {
        anyhow::bail!("Usage: finledger account-add <name> [--type <type>] [--initial <amount>]");
    }
    let account_type = flag(args, "--type").map_or(AccountType::Cash, AccountType::parse);
    let initial = flag(args, "--initial")
        .map(parse_amount)
        .transpose()?
        .unwrap_or_default();

    let id = db.insert_account(&NewAccount::new(name.as_str(), account_type, initial))?;
    println!("Added account {name} ({id})");
    Ok(())
}

fn cli_account_rm(args: &[String], db: &mut Database) -> Result<()> {
    let key = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: finledger account-rm <account>"))?;
    let account = resolve_account(db, key)?;
    db.delete_account(&account.id)?;
    println!("Deleted account {}", account.name);
    Ok(())
}

fn cli_categories(args: &[String], db: &mut Database) -> Result<()> {
    let categories = match args.first() {
        Some(kind) => db.get_categories_by_type(parse_kind(kind)?)?,
        None => db.get_categories()?,
    };
    println!("{:<24} {:<8} {:<7} ID", "Name", "Type", "Custom");
    println!("{}", "─".repeat(64));
    for cat in &categories {
        println!(
            "{:<24} {:<8} {:<7} {}",
            cat.name,
            cat.kind,
            if cat.is_custom { "yes" } else { "" },
            cat.id,
        );
    }
    Ok(())
}

// ── Transactions ──────────────────────────────────────────────

fn cli_add(args: &[String], db: &mut Database) -> Result<()> {
    let pos = positionals(args);
    let [kind, amount, category, ..] = pos.as_slice() else {
        anyhow::bail!(
            "Usage: finledger add <income|expense> <amount> <category> \
             [--account <a>] [--date <YYYY-MM-DD>] [--note <text>]"
        );
    };
    let kind = parse_kind(kind)?;
    let amount = parse_amount(amount)?;
    let category = resolve_category(&db.get_categories()?, category)?;
    if category.kind != kind {
        anyhow::bail!("Category '{}' is an {} category", category.name, category.kind);
    }
    let account = match flag(args, "--account") {
        Some(key) => resolve_account(db, key)?,
        None => default_account(db)?,
    };
    let date = match flag(args, "--date") {
        Some(d) => checked_day(d)?,
        None => format_day(dates::today()),
    };

    let mut new = NewTransaction::new(kind, amount, category.id, account.id.as_str(), date);
    if let Some(note) = flag(args, "--note") {
        new = new.with_note(note);
    }
    let id = db.add_transaction(&new)?;
    println!("Added {kind} {amount} to {} ({id})", account.name);
    Ok(())
}

fn cli_edit(args: &[String], db: &mut Database) -> Result<()> {
    let id = positionals(args)
        .first()
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Usage: finledger edit <id> [--amount ...]"))?;

    let mut patch = TransactionPatch {
        kind: flag(args, "--type").map(parse_kind).transpose()?,
        amount: flag(args, "--amount").map(parse_amount).transpose()?,
        date: flag(args, "--date").map(checked_day).transpose()?,
        note: flag(args, "--note").map(|n| Some(n.to_string())),
        ..Default::default()
    };
    if switch(args, "--clear-note") {
        patch.note = Some(None);
    }
    if let Some(key) = flag(args, "--category") {
        patch.category_id = Some(resolve_category(&db.get_categories()?, key)?.id);
    }
    if let Some(key) = flag(args, "--account") {
        patch.account_id = Some(resolve_account(db, key)?.id);
    }
    if patch.is_empty() {
        anyhow::bail!("Nothing to change");
    }

    db.update_transaction(&id, &patch)?;
    println!("Updated {id}");
    Ok(())
}

fn cli_rm(args: &[String], db: &mut Database) -> Result<()> {
    if args.is_empty() {
        anyhow::bail!("Usage: finledger rm <id>...");
    }
    let removed = db.bulk_delete_transactions(args)?;
    println!("Deleted {removed} of {} transaction(s)", args.len());
    Ok(())
}

fn cli_list(args: &[String], db: &mut Database) -> Result<()> {
    let mut filter = TransactionFilter::default().limit(50);
    if let Some(kind) = flag(args, "--type") {
        filter = filter.kind(parse_kind(kind)?);
    }
    let categories = db.get_categories()?;
    if let Some(key) = flag(args, "--category") {
        filter = filter.category(resolve_category(&categories, key)?.id);
    }
    if let Some(key) = flag(args, "--account") {
        filter = filter.account(resolve_account(db, key)?.id);
    }
    if let Some(from) = flag(args, "--from") {
        filter = filter.since(checked_day(from)?);
    }
    if let Some(to) = flag(args, "--to") {
        filter = filter.until(checked_day(to)?);
    }
    if let Some(limit) = flag(args, "--limit") {
        filter = filter.limit(limit.parse().with_context(|| format!("Invalid limit: {limit}"))?);
    }
    let order = if switch(args, "--asc") {
        SortOrder::Ascending
    } else {
        SortOrder::Descending
    };

    let txns = db.list_transactions(&filter, order)?;
    if txns.is_empty() {
        println!("No transactions");
        return Ok(());
    }
    let accounts = db.get_accounts()?;
    println!(
        "{:<10}  {:>12}  {:<18} {:<14} {:<20} ID",
        "Date", "Amount", "Category", "Account", "Note"
    );
    println!("{}", "─".repeat(100));
    for t in &txns {
        let category = Category::find_by_id(&categories, &t.category_id).map_or("?", |c| c.name.as_str());
        let account = accounts
            .iter()
            .find(|a| a.id == t.account_id)
            .map_or("?", |a| a.name.as_str());
        println!(
            "{:<10}  {:>12.2}  {:<18} {:<14} {:<20} {}",
            t.date,
            t.signed_amount(),
            category,
            account,
            t.note.as_deref().unwrap_or(""),
            t.id,
        );
    }
    Ok(())
}

fn cli_summary(args: &[String], db: &mut Database) -> Result<()> {
    let today = dates::today();
    let anchor = match args.first().filter(|a| !a.starts_with('-')) {
        Some(month) => parse_day(&format!("{month}-01"))?,
        None => today,
    };
    let (start, end) = month_bounds(anchor);
    let currency = db.get_settings().currency;

    let totals = db.totals(&TransactionFilter::default().between(start, end))?;
    let net_worth: Decimal = db.get_accounts()?.iter().map(Account::balance).sum();

    println!("finledger - {}", dates::month_key(anchor));
    println!("{}", "─".repeat(40));
    println!("  Income:     {}", money(&currency, totals.income));
    println!("  Expenses:   {}", money(&currency, totals.expense));
    println!("  Net:        {}", money(&currency, totals.net));
    println!("  Net Worth:  {}", money(&currency, net_worth));
    println!("  Total Txns: {}", db.get_transaction_count()?);

    let trend = db.monthly_trend(6, anchor)?;
    println!();
    println!("Last 6 months:");
    for m in &trend {
        println!(
            "  {}  in {:>12.2}  out {:>12.2}  net {:>12.2}",
            m.month, m.totals.income, m.totals.expense, m.totals.net
        );
    }
    Ok(())
}

// ── Budgets ───────────────────────────────────────────────────

fn cli_budget_set(args: &[String], db: &mut Database) -> Result<()> {
    let amount = positionals(args)
        .first()
        .map(|a| parse_amount(a))
        .transpose()?
        .ok_or_else(|| {
            anyhow::anyhow!("Usage: finledger budget-set <amount> [--category <c>] [--period <p>]")
        })?;
    let period = flag(args, "--period").map_or(Ok(BudgetPeriod::Monthly), parse_period)?;
    let category = flag(args, "--category")
        .map(|key| resolve_category(&db.get_categories()?, key))
        .transpose()?;
    let (start, _) = period_window(period, dates::today());

    let id = db.set_budget(
        category.as_ref().map(|c| c.id.as_str()),
        amount,
        period,
        &format_day(start),
    )?;
    let target = category.map_or_else(|| "overall".to_string(), |c| c.name);
    println!("Set {period} budget for {target}: {amount} ({id})");
    Ok(())
}

fn cli_budgets(args: &[String], db: &mut Database) -> Result<()> {
    let period = args
        .first()
        .map_or(Ok(BudgetPeriod::Monthly), |p| parse_period(p))?;
    let progress = db.budget_status(period, dates::today())?;
    if progress.is_empty() {
        println!("No {period} budgets");
        return Ok(());
    }
    let categories = db.get_categories()?;
    println!(
        "{:<20} {:>12} {:>12} {:>12} {:>7}",
        "Category", "Limit", "Spent", "Remaining", "Used"
    );
    println!("{}", "─".repeat(68));
    for p in &progress {
        let name = p
            .budget
            .category_id
            .as_deref()
            .and_then(|id| Category::find_by_id(&categories, id))
            .map_or("(overall)", |c| c.name.as_str());
        println!(
            "{:<20} {:>12.2} {:>12.2} {:>12.2} {:>6.1}%{}",
            name,
            p.budget.amount,
            p.spent,
            p.remaining,
            p.percentage,
            if p.is_over() { "  over" } else { "" },
        );
    }
    Ok(())
}

// ── Savings goals ─────────────────────────────────────────────

fn cli_goals(db: &mut Database) -> Result<()> {
    let summaries = db.goal_summary(dates::today())?;
    if summaries.is_empty() {
        println!("No savings goals");
        return Ok(());
    }
    for s in &summaries {
        let status = if s.goal.achieved { "achieved" } else { "active" };
        println!(
            "{} [{status}]  {:.2} / {:.2}  ({:.1}%)  {}",
            s.goal.name, s.goal.current_amount, s.goal.target_amount, s.percentage, s.goal.id
        );
        let p = &s.projection;
        match (p.months_remaining, p.predicted_date) {
            (Some(months), Some(date)) => {
                let track = match p.is_on_track {
                    Some(true) => ", on track",
                    Some(false) => ", behind target",
                    None => "",
                };
                println!(
                    "    avg {:.2}/month, {months} month(s) left, expected {}{track}",
                    p.avg_monthly_savings,
                    format_day(date)
                );
            }
            _ => println!(
                "    avg {:.2}/month, no completion estimate",
                p.avg_monthly_savings
            ),
        }
    }
    Ok(())
}

fn cli_goal_add(args: &[String], db: &mut Database) -> Result<()> {
    let pos = positionals(args);
    let [name, target, ..] = pos.as_slice() else {
        anyhow::bail!("Usage: finledger goal-add <name> <target> [--start <date>] [--by <date>]");
    };
    let start = match flag(args, "--start") {
        Some(d) => checked_day(d)?,
        None => format_day(dates::today()),
    };
    let mut goal = NewSavingsGoal::new(*name, parse_amount(target)?, start);
    if let Some(by) = flag(args, "--by") {
        goal = goal.with_target_date(checked_day(by)?);
    }
    let id = db.insert_goal(&goal)?;
    let net = db.net_savings_since(&goal.start_date)?;
    db.update_goal_progress(&id, net)?;
    println!("Added goal {} ({id})", goal.name.trim());
    Ok(())
}

fn cli_goal_rm(args: &[String], db: &mut Database) -> Result<()> {
    let id = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: finledger goal-rm <id>"))?;
    db.delete_goal(id)?;
    println!("Deleted goal {id}");
    Ok(())
}

// ── Maintenance ───────────────────────────────────────────────

fn cli_reconcile(args: &[String], db: &mut Database) -> Result<()> {
    let drift = if switch(args, "--check") {
        db.audit_balances()?
    } else {
        db.repair_balances()?
    };
    if drift.is_empty() {
        println!("All balances consistent");
        return Ok(());
    }
    for d in &drift {
        println!(
            "{:<20} stored {:>12.2}  expected {:>12.2}",
            d.account_name, d.stored, d.expected
        );
    }
    if switch(args, "--check") {
        anyhow::bail!("{} account(s) out of balance", drift.len());
    }
    println!("Repaired {} account(s)", drift.len());
    Ok(())
}

fn cli_settings(args: &[String], db: &mut Database) -> Result<()> {
    match (args.first().map(String::as_str), args.get(1)) {
        (None, _) => {
            let s = db.get_settings();
            println!("theme            {:?}", s.theme);
            println!("currency         {}", s.currency);
            println!(
                "default-account  {}",
                s.default_account_id.as_deref().unwrap_or("-")
            );
            println!(
                "goals updated    {}",
                s.savings_goals_last_update.as_deref().unwrap_or("never")
            );
        }
        (Some("theme"), Some(value)) => {
            let theme = Theme::parse(value)
                .ok_or_else(|| anyhow::anyhow!("Theme must be light, dark or system"))?;
            db.set_theme(theme)?;
        }
        (Some("currency"), Some(value)) => db.set_currency(value)?,
        (Some("default-account"), Some(value)) => {
            let account = resolve_account(db, value)?;
            db.set_default_account(&account.id)?;
        }
        _ => anyhow::bail!("Usage: finledger settings [theme|currency|default-account <value>]"),
    }
    Ok(())
}
