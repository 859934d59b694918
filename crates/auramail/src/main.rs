//! `AuraMail` - terminal email client with AI summaries, reply drafting and
//! proofreading.

mod command;
mod settings;
mod view;

use anyhow::Context;
use auramail_api::ApiClient;
use auramail_core::{ClientEvent, MailBackend, MailClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use command::{Command, HELP};
use settings::TokenStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they do not interleave with rendered output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auramail=info,auramail_core=info,auramail_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting AuraMail");

    let settings_path = settings::settings_path();
    let settings = settings::load_settings(&settings_path)
        .await
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;

    let api = ApiClient::new(&settings.base_url)
        .with_context(|| format!("Invalid base URL {}", settings.base_url))?
        .with_timeout(settings.request_timeout());
    info!("Using backend {}", api.base_url());

    let tokens = TokenStore::default_location();
    let mut client = MailClient::new(api, settings.client_config());
    if let Some(token) = tokens.load().await {
        client = client.with_stored_token(token);
    }
    client.start();
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_line(&mut client, &tokens, &line).await {
                    break;
                }
            }
            Some(event) = client.next_event(), if client.has_pending() => {
                handle_event(&client, &tokens, &event).await;
            }
        }
    }

    client.teardown();
    info!("Goodbye");
    Ok(())
}

/// Applies one input line. Returns false to quit.
async fn handle_line<B: MailBackend>(
    client: &mut MailClient<B>,
    tokens: &TokenStore,
    line: &str,
) -> bool {
    let command = match line.parse::<Command>() {
        Ok(command) => command,
        Err(e) => {
            if !e.is_empty() {
                println!("{e}");
            }
            return true;
        }
    };

    let result = match command {
        Command::Folder(folder) => {
            client.set_folder(folder);
            Ok(())
        }
        Command::Page(n) => {
            client.set_page(n);
            Ok(())
        }
        Command::Next => {
            client.next_page();
            Ok(())
        }
        Command::Prev => {
            client.previous_page();
            Ok(())
        }
        Command::Refresh => {
            client.refresh();
            Ok(())
        }
        Command::Search(query) => {
            client.search(query);
            print!("{}", view::render_mailbox(client.mailbox()));
            Ok(())
        }
        Command::List => {
            print!("{}", view::render_mailbox(client.mailbox()));
            Ok(())
        }
        Command::Open(id) => {
            client.open_message(id);
            Ok(())
        }
        Command::Close => {
            client.close_message();
            print!("{}", view::render_mailbox(client.mailbox()));
            Ok(())
        }
        Command::Read(id) => target(client, id).map(|id| client.mark_read(id)),
        Command::Delete(id) => target(client, id).map(|id| client.delete(id)),
        Command::Summarize(id) => target(client, id).and_then(|id| client.summarize(id)),
        Command::Suggest(id) => target(client, id).and_then(|id| client.generate_reply(id)),
        Command::Compose => client.compose_new().map(|()| show_compose(client)),
        Command::Reply => client.reply().map(|()| show_compose(client)),
        Command::To(to) => edit(client, |w| w.set_to(to)),
        Command::Subject(subject) => edit(client, |w| w.set_subject(subject)),
        Command::Body(body) => edit(client, |w| w.set_body(body)),
        Command::Proofread => client.proofread().map(|()| println!("Proofreading...")),
        Command::Retry => client.retry_proofread().map(|()| println!("Proofreading...")),
        Command::Apply => client.apply_suggestion().map(|()| show_compose(client)),
        Command::Dismiss => client.dismiss_suggestion().map(|()| show_compose(client)),
        Command::Send => client.send().map(|()| println!("Sending...")),
        Command::Cancel => client
            .cancel_compose()
            .map(|()| println!("{}", describe(&ClientEvent::ComposeClosed { sent: false }))),
        Command::Login => {
            client.start();
            Ok(())
        }
        Command::Logout => {
            client.logout();
            if let Err(e) = tokens.clear().await {
                tracing::warn!("Failed to remove stored token: {}", e);
            }
            Ok(())
        }
        Command::Help => {
            println!("{HELP}");
            Ok(())
        }
        Command::Quit => return false,
    };

    if let Err(e) = result {
        println!("! {e}");
    }
    true
}

/// Reacts to a completed request.
async fn handle_event<B: MailBackend>(
    client: &MailClient<B>,
    tokens: &TokenStore,
    event: &ClientEvent,
) {
    if let Some(line) = view::describe_event(event) {
        println!("{line}");
    }

    match event {
        ClientEvent::IdentityReady(_) => {
            if let Some(token) = client.session().token()
                && let Err(e) = tokens.save(token).await
            {
                tracing::warn!("Failed to store token: {}", e);
            }
        }
        ClientEvent::PageLoaded { silent: false } | ClientEvent::Deleted { closed: true, .. } => {
            print!("{}", view::render_mailbox(client.mailbox()));
        }
        ClientEvent::DetailLoaded(_)
        | ClientEvent::SummaryReady(_)
        | ClientEvent::ReplyReady(_) => {
            print!("{}", view::render_detail(client.messages()));
        }
        ClientEvent::ProofreadReady => show_compose(client),
        _ => {}
    }
}

fn describe(event: &ClientEvent) -> String {
    view::describe_event(event).unwrap_or_default()
}

/// Resolves an optional message id to the given one or the open message.
fn target<B: MailBackend>(
    client: &MailClient<B>,
    id: Option<String>,
) -> auramail_core::Result<String> {
    id.or_else(|| client.messages().selected().map(|id| id.as_str().to_string()))
        .ok_or(auramail_core::Error::NoMessageOpen)
}

fn edit<B: MailBackend>(
    client: &mut MailClient<B>,
    apply: impl FnOnce(&mut auramail_core::ComposeWorkflow) -> auramail_core::Result<()>,
) -> auramail_core::Result<()> {
    let workflow = client.compose_mut().ok_or_else(|| {
        auramail_core::Error::validation("No draft is open, use 'compose' or 'reply'")
    })?;
    apply(workflow)
}

fn show_compose<B: MailBackend>(client: &MailClient<B>) {
    if let Some(workflow) = client.compose() {
        print!("{}", view::render_compose(workflow));
    }
}
