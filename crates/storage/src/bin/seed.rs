use std::fmt;

use exam_core::model::{
    Question, QuestionDraft, QuestionId, QuestionKind, SimulationDraft,
};
use storage::repository::{QuestionRepository, Storage};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("EXAM_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  EXAM_DB_URL");
}

fn opts(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn sample_bank() -> Result<Vec<Question>, Box<dyn std::error::Error>> {
    let drafts = vec![
        QuestionDraft::multiple_choice(
            1,
            "What is the primary purpose of a firewall in network security?",
            opts(&[
                "To encrypt data transmission",
                "To filter network traffic based on predetermined rules",
                "To provide user authentication",
                "To compress network data",
            ]),
            "B",
            "A firewall filters network traffic based on predetermined security rules, \
             acting as a barrier between trusted and untrusted networks.",
        ),
        QuestionDraft {
            number: 2,
            text: "A VPN provides end-to-end encryption for all network communications."
                .to_string(),
            options: opts(&["True", "False"]),
            key: "B".to_string(),
            explanation: "While VPNs encrypt data between the client and VPN server, they \
                          do not provide true end-to-end encryption: data is decrypted at \
                          the VPN server."
                .to_string(),
            kind: QuestionKind::TrueFalse,
            image: None,
            simulation: None,
        },
        QuestionDraft {
            number: 3,
            text: "Based on the network diagram shown, what type of topology is this?"
                .to_string(),
            options: opts(&["Star", "Ring", "Bus", "Mesh"]),
            key: "A".to_string(),
            explanation: "All devices connect to a central hub or switch, which makes this \
                          a star topology."
                .to_string(),
            kind: QuestionKind::MultipleChoice,
            image: Some("https://images.example.com/network-topology.jpeg".to_string()),
            simulation: None,
        },
        QuestionDraft::multiple_choice(
            4,
            "Which TWO protocols operate at the transport layer of the OSI model?",
            opts(&["TCP", "IP", "UDP", "HTTP", "ICMP"]),
            "A,C",
            "TCP and UDP are the transport-layer protocols. IP and ICMP live at the \
             network layer; HTTP is an application-layer protocol.",
        ),
        QuestionDraft {
            number: 5,
            text: "Configure a basic firewall rule to block incoming traffic on port 80."
                .to_string(),
            options: opts(&[
                "Deny inbound TCP on port 80",
                "Allow inbound TCP on port 80",
                "Deny outbound UDP on port 80",
                "Allow all and log port 80",
            ]),
            key: "A".to_string(),
            explanation: "Blocking incoming HTTP traffic means a rule that denies inbound \
                          connections on TCP port 80."
                .to_string(),
            kind: QuestionKind::Simulation,
            image: None,
            simulation: Some(SimulationDraft {
                instructions: "Use the firewall interface to create a rule blocking port 80."
                    .to_string(),
                assets: vec![
                    "https://images.example.com/firewall-1.jpeg".to_string(),
                    "https://images.example.com/firewall-2.jpeg".to_string(),
                ],
            }),
        },
        QuestionDraft {
            number: 6,
            text: "Match the correct cable type to each network scenario.".to_string(),
            options: opts(&[
                "Ethernet for LAN, fiber optic for long distance",
                "Fiber optic for LAN, Ethernet for long distance",
                "Coaxial for both scenarios",
                "Ethernet for both scenarios",
            ]),
            key: "A".to_string(),
            explanation: "Ethernet cables serve local area networks; fiber optic cables \
                          are preferred for long-distance, high-speed links."
                .to_string(),
            kind: QuestionKind::DragDrop,
            image: Some("https://images.example.com/cables.jpeg".to_string()),
            simulation: None,
        },
    ];

    let mut questions = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let id = QuestionId::new(u64::from(draft.number));
        questions.push(Question::from_persisted(id, draft)?);
    }
    Ok(questions)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let bank = sample_bank()?;
    for question in &bank {
        storage.questions.upsert_question(question).await?;
    }

    println!(
        "Seeded {} questions into {}",
        bank.len(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
