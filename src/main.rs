//! Command line front-end for browsing therapy sessions.

use std::env;

use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use config::Config;
use dotenvy::dotenv;

use clinic_sessions::domain::session::{PaymentStatus, SessionDisplay};
use clinic_sessions::dto::calendar::CalendarWeek;
use clinic_sessions::models::config::ClientConfig;
use clinic_sessions::repository::HttpRepository;
use clinic_sessions::services::ServiceResult;
use clinic_sessions::services::calendar::CalendarController;
use clinic_sessions::services::session_list::SessionListController;
use clinic_sessions::services::sessions::list_pending_payments;

#[derive(Parser)]
#[command(name = "clinic-sessions")]
#[command(about = "Browse therapy sessions by month, list and day", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the month grid with the number of sessions per day
    Calendar {
        #[arg(long, requires = "month")]
        year: Option<i32>,
        #[arg(long, requires = "year")]
        month: Option<u32>,
    },
    /// Print one page of the filtered session list with totals
    Sessions {
        /// Part of the patient's name
        #[arg(long)]
        search: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
        /// pagado | pendiente
        #[arg(long)]
        status: Option<PaymentStatus>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Print the sessions of one day together with their transcriptions
    Day {
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
    },
    /// Print the sessions still awaiting payment
    Pending,
}

fn load_config() -> Result<ClientConfig, config::ConfigError> {
    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(config::Environment::with_prefix("APP"))
        .build()?
        .try_deserialize::<ClientConfig>()
}

fn session_line(session: &SessionDisplay) -> String {
    let patient = session
        .patient
        .as_ref()
        .map(|p| p.full_name.as_str())
        .unwrap_or("(sin paciente)");
    format!(
        "#{:<4} {} {}-{} ({:>10})  {:<24} {:<12} {:>10.0}  {}",
        session.id,
        session.date,
        session.start_time,
        session.end_time,
        session.duration_label(),
        patient,
        session.session_type_label(),
        session.amount,
        session.payment_status().label(),
    )
}

fn print_grid(label: &str, weeks: &[CalendarWeek]) {
    println!("{label}");
    println!("{}", ["lu", "ma", "mi", "ju", "vi", "sá", "do"].map(|d| format!("{d:>7}")).join(""));
    for week in weeks {
        let row: String = week
            .days
            .iter()
            .map(|day| {
                let marker = if day.is_today { "*" } else { " " };
                match (day.is_current_month, day.session_count) {
                    (false, _) => format!("{:>7}", "·"),
                    (true, 0) => format!("{:>6}{marker}", day.day),
                    (true, n) => format!("{:>3}({n}){marker}", day.day),
                }
            })
            .collect();
        println!("{row}");
    }
}

async fn run(
    command: Command,
    config: &ClientConfig,
    repo: &HttpRepository,
) -> ServiceResult<()> {
    let today = Local::now().date_naive();

    match command {
        Command::Calendar { year, month } => {
            let mut calendar = CalendarController::new(today);
            if let (Some(year), Some(month)) = (year, month)
                && !calendar.go_to(year, month)
            {
                log::warn!("Ignoring invalid month {year}-{month}");
            }
            calendar.load_month(repo, today).await?;
            let view = calendar.view_state();
            print_grid(&view.month_label, view.weeks);
        }
        Command::Sessions {
            search,
            date,
            status,
            page,
        } => {
            let mut list = SessionListController::from_config(config);
            list.load(repo).await?;
            if let Some(search) = search {
                list.set_search(search);
            }
            list.set_date(date);
            list.set_status(status);
            if !list.go_to_page(page) && page != 1 {
                log::warn!("Page {page} is out of range");
            }

            let view = list.view_state(chrono::Utc::now());
            for session in &view.page.items {
                println!("{}", session_line(session));
            }
            println!(
                "Mostrando {} de {} sesiones (página {} de {}: {:?})",
                view.max_displayed,
                view.page.total_items,
                view.page.page,
                view.page.total_pages.max(1),
                view.page.pages
            );
            println!(
                "Pagadas: {}  Pendientes: {}  Recaudado: {:.0}  Total: {:.0}",
                view.totals.paid_count,
                view.totals.pending_count,
                view.totals.paid_total,
                view.totals.total_revenue
            );
        }
        Command::Day { date } => {
            let mut calendar = CalendarController::new(today);
            calendar.go_to(date.year(), date.month());
            calendar.load_month(repo, today).await?;
            match calendar.show_day(repo, date).await {
                Some(detail) => {
                    println!("{date}: {} sesiones", detail.day.session_count);
                    for (session, transcription) in detail.sessions_with_transcriptions() {
                        println!("{}", session_line(session));
                        match transcription {
                            Some(transcription) => println!("    {}", transcription.content),
                            None => println!("    (sin transcripción)"),
                        }
                    }
                }
                None => log::warn!("{date} is not part of the displayed month"),
            }
        }
        Command::Pending => {
            let sessions = list_pending_payments(repo).await?;
            for session in &sessions {
                println!("{}", session_line(session));
            }
            println!("{} sesiones pendientes de pago", sessions.len());
        }
    }

    Ok(())
}

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Error loading client config: {err}");
            std::process::exit(1);
        }
    };

    let repo = match HttpRepository::new(&config) {
        Ok(repo) => repo,
        Err(err) => {
            log::error!("Failed to build HTTP client: {err}");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("Failed to start async runtime: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(run(cli.command, &config, &repo)) {
        log::error!("Command failed: {err}");
        eprintln!("{}", err.user_message());
        std::process::exit(1);
    }
}
