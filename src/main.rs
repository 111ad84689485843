use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_manager::{api, bootstrap, config::AppConfig, models::*};

#[derive(Parser)]
#[command(name = "stm")]
#[command(about = "Eisenhower-matrix study and time manager")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the JSON API for a front end
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),
    /// Manage subject scores
    #[command(subcommand)]
    Subject(SubjectCommand),
    /// Fetch study advice
    Advice,
}

#[derive(Subcommand)]
enum TaskCommand {
    /// Add a task
    Add {
        title: String,
        #[arg(short, long, value_enum)]
        quadrant: Option<Quadrant>,
        /// Deadline, usually YYYY-MM-DD
        #[arg(short, long, default_value = "")]
        deadline: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List tasks, earliest deadline first
    List {
        #[arg(short, long, value_enum)]
        quadrant: Option<Quadrant>,
    },
    /// Flip a task's completion flag
    Toggle { id: TaskId },
    /// Delete a task
    Delete { id: TaskId },
}

#[derive(Subcommand)]
enum SubjectCommand {
    /// Record a subject score
    Add { subject: String, score: String },
    /// List subjects with feedback
    List,
    /// Delete a subject
    Delete { id: SubjectId },
}

#[derive(Clone, Copy, ValueEnum)]
enum Quadrant {
    UrgentImportant,
    UrgentNotImportant,
    ImportantNotUrgent,
    StudyReview,
}

impl From<Quadrant> for Category {
    fn from(q: Quadrant) -> Self {
        match q {
            Quadrant::UrgentImportant => Category::UrgentImportant,
            Quadrant::UrgentNotImportant => Category::UrgentNotImportant,
            Quadrant::ImportantNotUrgent => Category::ImportantNotUrgent,
            Quadrant::StudyReview => Category::StudyReview,
        }
    }
}

/// Initialize tracing. Logs go to stderr so command output stays clean.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "study_manager=info,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_task(task: &Task) {
    let mark = if task.is_completed { "x" } else { " " };
    let quadrant = task.category.map(|c| c.label()).unwrap_or("-");
    let deadline = if task.deadline.is_empty() {
        "no deadline"
    } else {
        task.deadline.as_str()
    };
    println!(
        "[{mark}] #{:<4} {:<26} {:<12} {}",
        task.id, quadrant, deadline, task.title
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::load();
    let app = bootstrap(&config).await?;

    match cli.command.unwrap_or(Commands::Serve { port: 3000 }) {
        Commands::Serve { port } => {
            let router = api::create_router(app);
            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!("Study manager listening on http://127.0.0.1:{}", port);
            axum::serve(listener, router).await?;
        }
        Commands::Task(TaskCommand::Add {
            title,
            quadrant,
            deadline,
            description,
        }) => {
            let task = match quadrant {
                Some(q) => {
                    app.add_task_in(q.into(), &title, &deadline, &description)
                        .await?
                }
                None => app.add_task(&title, &deadline, &description).await?,
            };
            print_task(&task);
        }
        Commands::Task(TaskCommand::List { quadrant }) => {
            let snapshot = app.tasks();
            let tasks = match quadrant {
                Some(q) => snapshot.quadrant(q.into()),
                None => snapshot.by_deadline(),
            };
            for task in &tasks {
                print_task(task);
            }
        }
        Commands::Task(TaskCommand::Toggle { id }) => {
            let task = app
                .task(id)
                .ok_or_else(|| anyhow::anyhow!("task {id} not found"))?;
            print_task(&app.toggle_task(&task).await?);
        }
        Commands::Task(TaskCommand::Delete { id }) => {
            if let Some(task) = app.task(id) {
                app.delete_task(&task).await?;
            }
        }
        Commands::Subject(SubjectCommand::Add { subject, score }) => {
            let subject = app.add_subject_text(&subject, &score).await?;
            println!("#{} {} {}", subject.id, subject.subject, subject.score);
        }
        Commands::Subject(SubjectCommand::List) => {
            for subject in app.subjects() {
                println!(
                    "#{:<4} {:<20} {:>6.1}  {}",
                    subject.id,
                    subject.subject,
                    subject.score,
                    subject.tier().feedback()
                );
            }
        }
        Commands::Subject(SubjectCommand::Delete { id }) => {
            if let Some(subject) = app.subject(id) {
                app.delete_subject(&subject).await?;
            }
        }
        Commands::Advice => {
            if !app.load_advisories(|_| {}).await {
                anyhow::bail!("Could not load study advice");
            }
            for suggestion in app.advisories().await {
                println!("* {}: {}", suggestion.title, suggestion.description);
            }
        }
    }

    Ok(())
}
