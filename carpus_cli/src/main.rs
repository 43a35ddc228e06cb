use carpus_core::*;
use clap::{Parser, Subcommand};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "carpus")]
#[command(about = "Hand and carpus fracture classification codec", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one or more fractures interactively (default)
    Classify {
        /// Comma-separated answer keys for non-interactive runs
        #[arg(long)]
        answers: Option<String>,

        /// Show the resulting code without recording anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Check a classification code for structural validity
    Check {
        /// The code to check, e.g. 72.Bb
        code: String,
    },

    /// Print the bone family taxonomy
    Families,

    /// List recently recorded classifications
    List {
        /// How many days back to look
        #[arg(long, default_value_t = 30)]
        days: i64,
    },

    /// Roll the journal up into the CSV register
    Export {
        /// Clean up processed journal files after the rollup
        #[arg(long)]
        cleanup: bool,
    },
}

fn main() -> Result<()> {
    carpus_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Classify { answers, dry_run }) => {
            cmd_classify(data_dir, answers, dry_run, &config)
        }
        Some(Commands::Check { code }) => cmd_check(&code),
        Some(Commands::Families) => cmd_families(),
        Some(Commands::List { days }) => cmd_list(data_dir, days),
        Some(Commands::Export { cleanup }) => cmd_export(data_dir, cleanup),
        None => cmd_classify(data_dir, None, false, &config),
    }
}

/// Answers either scripted via --answers or read from stdin
struct AnswerFeed {
    scripted: Option<VecDeque<String>>,
}

impl AnswerFeed {
    fn new(answers: Option<String>) -> Self {
        let scripted = answers.map(|a| {
            a.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });
        Self { scripted }
    }

    fn is_scripted(&self) -> bool {
        self.scripted.is_some()
    }

    fn has_more(&self) -> bool {
        self.scripted.as_ref().map(|q| !q.is_empty()).unwrap_or(true)
    }

    /// Next answer; None only when a script runs out
    fn next(&mut self) -> Result<Option<String>> {
        match &mut self.scripted {
            Some(queue) => Ok(queue.pop_front()),
            None => {
                print!("> ");
                io::stdout().flush()?;
                let mut input = String::new();
                io::stdin().read_line(&mut input)?;
                Ok(Some(input.trim().to_string()))
            }
        }
    }
}

fn cmd_classify(
    data_dir: PathBuf,
    answers: Option<String>,
    dry_run: bool,
    config: &Config,
) -> Result<()> {
    let taxonomy = default_taxonomy();
    let errors = taxonomy.validate();
    if !errors.is_empty() {
        eprintln!("Taxonomy validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::TaxonomyValidation("Invalid taxonomy".into()));
    }

    let journal_path = data_dir.join("journal").join("fracture_entries.jsonl");
    let case_path = data_dir.join("case.json");
    let referral_path = config
        .intake
        .referral_path
        .clone()
        .unwrap_or_else(|| data_dir.join("intake").join("referral.json"));

    // Seed the session from the active case plus any referral
    let case = CaseRecord::load(&case_path)?;
    let mut seed = case.fractures.clone();
    if let Some(referred) = load_referral(&referral_path)? {
        let known: std::collections::HashSet<_> = seed.iter().map(|e| e.id).collect();
        seed.extend(referred.into_iter().filter(|e| !known.contains(&e.id)));
    }
    if !seed.is_empty() {
        println!(
            "Resuming case {} with {} prior classification(s)",
            case.id,
            seed.len()
        );
    }

    let mut session = CaptureSession::with_entries(seed);
    let mut feed = AnswerFeed::new(answers);

    loop {
        let prompt = session.next_step(taxonomy);
        match prompt.step {
            Step::Review => {
                let code = session.preview();
                display_review(&session, &code, config);

                let verdict = validate(taxonomy, &code);
                if !verdict.valid {
                    println!(
                        "  ⚠ Code failed validation: {}",
                        verdict.reason.clone().unwrap_or_default()
                    );
                }

                if dry_run {
                    println!("\n[Dry run - nothing recorded]");
                    return Ok(());
                }

                let Some(input) = feed.next()? else {
                    return Err(Error::Other(
                        "answer script ended before review was resolved".into(),
                    ));
                };
                match input.to_lowercase().as_str() {
                    "back" => {
                        session.apply(taxonomy, Event::Back);
                    }
                    "d" | "discard" => {
                        session.discard();
                        println!("\nClassification discarded.");
                        if !classify_another(&mut feed)? {
                            break;
                        }
                    }
                    _ => {
                        if config.capture.block_invalid && !verdict.valid {
                            println!("\n✗ Not recording an invalid code.");
                            session.discard();
                        } else if let Some(entry) = session.commit(taxonomy) {
                            let mut sink = JsonlSink::new(&journal_path);
                            sink.append(&entry)?;
                            CaseRecord::update(&case_path, |case| {
                                case.fractures.push(entry.clone());
                                Ok(())
                            })?;
                            println!("\n✓ Fracture recorded: {}", entry.ao_code);
                        }
                        if !classify_another(&mut feed)? {
                            break;
                        }
                    }
                }
            }
            step => {
                display_question(step, &prompt.options, &session);

                let Some(input) = feed.next()? else {
                    return Err(Error::Other(
                        "answer script ended before the classification was complete".into(),
                    ));
                };
                let Some(choice) = resolve_choice(&prompt.options, &input) else {
                    if input.eq_ignore_ascii_case("back") {
                        session.apply(taxonomy, Event::Back);
                        continue;
                    }
                    if feed.is_scripted() {
                        return Err(Error::Other(format!("unrecognized answer '{}'", input)));
                    }
                    println!("Unrecognized answer: {}", input);
                    continue;
                };
                if let Some(event) = event_for(step, &choice.key, &session) {
                    session.apply(taxonomy, event);
                }
            }
        }
    }

    Ok(())
}

fn classify_another(feed: &mut AnswerFeed) -> Result<bool> {
    if feed.is_scripted() {
        return Ok(feed.has_more());
    }
    print!("\nClassify another fracture? [y/N] > ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Map an offered option key back to a cascade event
fn event_for(step: Step, key: &str, session: &CaptureSession) -> Option<Event> {
    match step {
        Step::BoneSelect => {
            if session.selection().category.is_none() {
                BoneCategory::from_key(key).map(Event::SelectCategory)
            } else {
                BoneId::from_key(key).map(Event::SelectBone)
            }
        }
        Step::FingerSelect => key
            .chars()
            .next()
            .and_then(Finger::from_digit)
            .map(Event::SelectFinger),
        Step::PhalanxSelect => key
            .chars()
            .next()
            .and_then(PhalanxLevel::from_digit)
            .map(Event::SelectPhalanx),
        Step::SegmentSelect => key
            .chars()
            .next()
            .and_then(Segment::from_digit)
            .map(Event::SelectSegment),
        Step::TypeSelect => key
            .chars()
            .next()
            .and_then(FractureGroup::from_letter)
            .map(Event::SelectType),
        Step::QualificationSelect => {
            if key == "skip" {
                Some(Event::SkipQualifications)
            } else {
                Some(Event::SetQualifications(key.chars().collect()))
            }
        }
        Step::Review => None,
    }
}

fn resolve_choice<'a>(options: &'a [Choice], input: &str) -> Option<&'a Choice> {
    options.iter().find(|c| c.key.eq_ignore_ascii_case(input))
}

fn display_question(step: Step, options: &[Choice], session: &CaptureSession) {
    let heading = match step {
        Step::BoneSelect => {
            if session.selection().category.is_none() {
                "Bone category"
            } else {
                "Carpal bone"
            }
        }
        Step::FingerSelect => "Finger",
        Step::PhalanxSelect => "Phalanx",
        Step::SegmentSelect => "Segment",
        Step::TypeSelect => "Fracture type",
        Step::QualificationSelect => "Location qualifier",
        Step::Review => "Review",
    };

    println!();
    println!("{}:", heading);
    for choice in options {
        println!("  [{}] {}", choice.key, choice.label);
    }
}

fn display_review(session: &CaptureSession, code: &str, config: &Config) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  REVIEW CLASSIFICATION");
    println!("╰─────────────────────────────────────────╯");
    println!();

    let selection = session.selection();
    if let Some(bone) = selection.bone {
        println!("  Bone: {}", bone.display_name());
    }
    if let Some(finger) = selection.finger {
        println!("  Finger: {}", finger.display_name());
    }
    if let Some(phalanx) = selection.phalanx {
        println!("  Phalanx: {}", phalanx.display_name());
    }
    if let Some(segment) = selection.segment {
        println!("  Segment: {}", segment.display_name());
    }
    if let Some(group) = selection.fracture_type {
        println!("  Type: {}", group.letter());
    }
    if let Some(qualifiers) = &selection.qualifications {
        if !qualifiers.is_empty() {
            println!("  Qualifier: {}", qualifiers.iter().collect::<String>());
        }
    }

    if config.capture.review_preview {
        println!();
        println!("  Code: {}", code);
    }

    println!();
    println!("Press Enter to commit");
    println!("  'back' + Enter to change the last answer");
    println!("  'd' + Enter to discard");
}

fn cmd_check(code: &str) -> Result<()> {
    let verdict = validate(default_taxonomy(), code);
    if verdict.valid {
        println!("✓ {} is structurally valid", code);
        Ok(())
    } else {
        println!(
            "✗ {} is invalid: {}",
            code,
            verdict.reason.unwrap_or_default()
        );
        std::process::exit(1);
    }
}

fn cmd_families() -> Result<()> {
    let taxonomy = default_taxonomy();
    for family in taxonomy.families_ordered() {
        println!("{}  {}", family.code, family.name);
        match &family.rules {
            FamilyRules::CarpalSingle { types } => {
                for entry in types {
                    println!("      {}  {}", entry.group.letter(), entry.label);
                }
            }
            FamilyRules::CarpalSubBones { sub_bones } => {
                for sub in sub_bones {
                    println!("      {}", sub.name);
                    for entry in &sub.types {
                        println!("        {}  {}", entry.group.letter(), entry.label);
                    }
                }
            }
            FamilyRules::MetacarpalLongBone { by_segment }
            | FamilyRules::PhalanxLongBone { by_segment } => {
                for (segment, table) in Segment::ALL.iter().zip(by_segment.iter()) {
                    println!("      Segment {} ({})", segment.digit(), segment.display_name());
                    for entry in table {
                        println!("        {}  {}", entry.group.letter(), entry.label);
                    }
                }
            }
            FamilyRules::CrushMultiple => {
                println!("      (no further questions)");
            }
        }
        if !family.qualifications.is_empty() {
            let qualifiers: Vec<String> = family
                .qualifications
                .iter()
                .map(|q| format!("{} {}", q.key, q.label))
                .collect();
            println!("      Qualifiers (types B/C): {}", qualifiers.join(", "));
        }
    }
    Ok(())
}

fn cmd_list(data_dir: PathBuf, days: i64) -> Result<()> {
    let journal_path = data_dir.join("journal").join("fracture_entries.jsonl");
    let register_path = data_dir.join("register.csv");

    let entries = load_recent_entries(&journal_path, &register_path, days)?;
    if entries.is_empty() {
        println!("No classifications recorded in the last {} days.", days);
        return Ok(());
    }

    println!("{} classification(s) in the last {} days:", entries.len(), days);
    for entry in entries {
        println!(
            "  {}  {:<8}  {}",
            entry.recorded_at.format("%Y-%m-%d %H:%M"),
            entry.ao_code,
            entry.bone_name
        );
    }
    Ok(())
}

fn cmd_export(data_dir: PathBuf, cleanup: bool) -> Result<()> {
    let journal_dir = data_dir.join("journal");
    let journal_path = journal_dir.join("fracture_entries.jsonl");
    let csv_path = data_dir.join("register.csv");

    if !journal_path.exists() {
        println!("No journal found - nothing to export.");
        return Ok(());
    }

    let count = journal_to_csv_and_archive(&journal_path, &csv_path)?;

    println!("✓ Exported {} entries to the register", count);
    println!("  Register: {}", csv_path.display());

    if cleanup {
        let cleaned = carpus_core::register::cleanup_processed_journals(&journal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed journal files", cleaned);
        }
    }

    Ok(())
}
