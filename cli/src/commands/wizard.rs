use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use medagent_core::advisory::AdvisoryResult;
use medagent_core::intake::{IntakeConfig, IntakeForm, PatientRecord, validate};
use medagent_core::risk::RiskCategory;
use medagent_core::symptoms::SymptomCatalog;
use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use crate::relay::{IntakeProfile, RelayAdvisor};
use crate::session::{Advisor, AdvisorySession};
use crate::timer::AutoAdvance;
use crate::util::to_pretty;

enum Screen {
    Intake,
    Risk(PatientRecord, RiskCategory),
    Advice(PatientRecord, RiskCategory),
}

enum RiskAction {
    Advance,
    Restart,
    Quit,
}

enum AdviceAction {
    Refresh,
    NewAssessment,
    Quit,
}

pub async fn run(api_url: &str, auto_advance_secs: u64, anonymous: bool) -> i32 {
    let profile = IntakeProfile::fetch_or_default(api_url).await;
    let advisor = Arc::new(RelayAdvisor::for_profile(api_url, &profile).anonymous(anonymous));
    let auto_advance = (auto_advance_secs > 0).then(|| Duration::from_secs(auto_advance_secs));
    let input = BufReader::new(tokio::io::stdin());

    match run_session(input, &mut io::stdout(), &profile, advisor, auto_advance).await {
        Ok(()) => 0,
        Err(e) => {
            let err = json!({
                "error": "cli_error",
                "message": format!("Terminal I/O failed: {e}")
            });
            eprintln!("{}", to_pretty(&err));
            4
        }
    }
}

/// Drive intake, risk and advice screens until the user quits or input ends.
pub async fn run_session<R, W, A>(
    input: R,
    out: &mut W,
    profile: &IntakeProfile,
    advisor: Arc<A>,
    auto_advance: Option<Duration>,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    A: Advisor,
{
    let mut lines = input.lines();
    let mut session = AdvisorySession::new(advisor);
    let mut screen = Screen::Intake;

    loop {
        screen = match screen {
            Screen::Intake => match collect_intake(&mut lines, out, &profile.intake).await? {
                Some(record) => {
                    let risk = profile.rules.classify(&record);
                    Screen::Risk(record, risk)
                }
                None => return Ok(()),
            },
            Screen::Risk(record, risk) => {
                show_risk(out, &record, risk)?;
                match risk_screen(&mut lines, out, auto_advance).await? {
                    RiskAction::Advance => {
                        session.request(record.clone(), risk);
                        Screen::Advice(record, risk)
                    }
                    RiskAction::Restart => {
                        session.restart();
                        Screen::Intake
                    }
                    RiskAction::Quit => return Ok(()),
                }
            }
            Screen::Advice(record, risk) => {
                writeln!(out, "\nFetching advice...")?;
                match advice_screen(&mut lines, out, &mut session).await? {
                    AdviceAction::Refresh => {
                        session.request(record.clone(), risk);
                        Screen::Advice(record, risk)
                    }
                    AdviceAction::NewAssessment => {
                        session.restart();
                        Screen::Intake
                    }
                    AdviceAction::Quit => return Ok(()),
                }
            }
        };
    }
}

async fn prompt<R, W>(lines: &mut Lines<R>, out: &mut W, label: &str) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{label}")?;
    out.flush()?;
    Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
}

/// Symptom answers are comma separated; each token is a 1-based checklist
/// number or a symptom id.
fn parse_symptoms(answer: &str, catalog: &SymptomCatalog) -> Vec<String> {
    let entries: Vec<_> = catalog.iter().collect();
    answer
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| match token.parse::<usize>() {
            Ok(n) if (1..=entries.len()).contains(&n) => entries[n - 1].name.clone(),
            _ => token.to_string(),
        })
        .collect()
}

async fn collect_intake<R, W>(
    lines: &mut Lines<R>,
    out: &mut W,
    config: &IntakeConfig,
) -> io::Result<Option<PatientRecord>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "\n== Symptom intake ==")?;
    let mut form = IntakeForm::default();

    loop {
        let Some(name) = prompt(lines, out, "Name: ").await? else {
            return Ok(None);
        };
        form.name = name;
        match validate(&form, config) {
            Err(err) if err.field() == "name" => writeln!(out, "{err}")?,
            _ => break,
        }
    }

    let age_label = format!("Age ({}-{}): ", config.age_bounds.min, config.age_bounds.max);
    loop {
        let Some(age) = prompt(lines, out, &age_label).await? else {
            return Ok(None);
        };
        form.age = age.parse().ok();
        match validate(&form, config) {
            Err(err) if err.field() == "age" => writeln!(out, "{err}")?,
            _ => break,
        }
    }

    for (i, symptom) in config.catalog.iter().enumerate() {
        writeln!(out, "  {:>2}. {}", i + 1, symptom.label)?;
    }
    loop {
        let Some(answer) = prompt(lines, out, "Symptoms (numbers or ids, comma separated): ").await?
        else {
            return Ok(None);
        };
        form.symptoms = parse_symptoms(&answer, &config.catalog);
        match validate(&form, config) {
            Ok(record) => return Ok(Some(record)),
            Err(err) => writeln!(out, "{err}")?,
        }
    }
}

fn show_risk<W: Write>(out: &mut W, record: &PatientRecord, risk: RiskCategory) -> io::Result<()> {
    writeln!(
        out,
        "\n{}, {}: {}",
        record.name(),
        record.age(),
        record.selected_labels().join(", ")
    )?;
    writeln!(out, "Risk level: {risk}")?;
    writeln!(out, "{}", risk.guidance())
}

async fn timer_fired(timer: &mut Option<AutoAdvance>) -> bool {
    match timer {
        Some(timer) => timer.fired().await,
        None => std::future::pending().await,
    }
}

async fn risk_screen<R, W>(
    lines: &mut Lines<R>,
    out: &mut W,
    auto_advance: Option<Duration>,
) -> io::Result<RiskAction>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    match auto_advance {
        Some(delay) => writeln!(
            out,
            "Continuing to advice in {}s. [Enter] continue now  [r] restart",
            delay.as_secs_f32()
        )?,
        None => writeln!(out, "[Enter] continue  [r] restart")?,
    }
    let mut timer = auto_advance.map(AutoAdvance::start);

    loop {
        let line = tokio::select! {
            true = timer_fired(&mut timer) => return Ok(RiskAction::Advance),
            line = lines.next_line() => line?,
        };
        match line.as_deref().map(str::trim) {
            None | Some("q") => return Ok(RiskAction::Quit),
            Some("") => return Ok(RiskAction::Advance),
            Some("r") => return Ok(RiskAction::Restart),
            Some(other) => writeln!(out, "Unknown choice '{other}'")?,
        }
    }
}

fn show_advisory<W: Write>(out: &mut W, advisory: &AdvisoryResult) -> io::Result<()> {
    writeln!(out, "\nAdvice:\n{}", advisory.text)?;
    if let Some(notice) = &advisory.notice {
        writeln!(out, "({notice})")?;
    }
    writeln!(out, "[Enter/r] refresh  [n] new assessment  [q] quit")
}

async fn advice_screen<R, W, A>(
    lines: &mut Lines<R>,
    out: &mut W,
    session: &mut AdvisorySession<A>,
) -> io::Result<AdviceAction>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    A: Advisor,
{
    let mut shown = false;
    loop {
        tokio::select! {
            resolved = session.next_resolved(), if !shown => {
                if let Some(advisory) = resolved {
                    show_advisory(out, &advisory)?;
                }
                shown = true;
            }
            line = lines.next_line() => {
                match line?.as_deref().map(str::trim) {
                    None | Some("q") => return Ok(AdviceAction::Quit),
                    Some("n") => return Ok(AdviceAction::NewAssessment),
                    Some("") | Some("r") => return Ok(AdviceAction::Refresh),
                    Some(other) => writeln!(out, "Unknown choice '{other}'")?,
                }
            }
        }
    }
}
