use crate::config::{
    default_settings_path, default_state_root, load_global_settings, request_database_path,
    save_settings, Settings,
};
use crate::directory::DirectoryApiClient;
use crate::events::{Ack, EventHandler, InboundEvent, Intent, IntentClassifier};
use crate::notify::{Notifier, WebhookSink};
use crate::store::{RequestRecord, RequestStatus, RequestStore, ScanFilter};
use crate::workflow::RequestDraft;
use serde_json::Value;
use std::fs;

const USAGE: &str = "usage: opsdesk <command>\n\
    \n\
    commands:\n\
    \x20 init                   write default settings to the global path\n\
    \x20 handle <event.json>    process one inbound event file\n\
    \x20 list [status]          list stored requests, newest first\n\
    \x20 show <request_id>      print one request record as json\n\
    \x20 help                   print this help";

struct KeywordClassifier;

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, sender_identity: &str, channel_context: &Value, text: &str) -> Intent {
        let words: Vec<&str> = text.split_whitespace().collect();
        let draft = match words.as_slice() {
            ["add", subject, "to", resource] => RequestDraft {
                kind: crate::store::RequestKind::GroupAdd,
                subject_identity: (*subject).to_string(),
                target_resource: (*resource).to_string(),
                requester_identity: sender_identity.to_string(),
                origin_context: channel_context.clone(),
            },
            ["remove", subject, "from", resource] => RequestDraft {
                kind: crate::store::RequestKind::GroupRemove,
                subject_identity: (*subject).to_string(),
                target_resource: (*resource).to_string(),
                requester_identity: sender_identity.to_string(),
                origin_context: channel_context.clone(),
            },
            _ => return Intent::Other,
        };
        Intent::DirectoryChange(draft)
    }
}

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let mut args = args.into_iter();
    let command = args.next().unwrap_or_else(|| "help".to_string());
    match command.as_str() {
        "init" => init_settings(),
        "handle" => {
            let path = args.next().ok_or("handle requires an event file path")?;
            let settings = load_global_settings().map_err(|err| err.to_string())?;
            handle_event_file(&settings, &path)
        }
        "list" => {
            let status = match args.next() {
                Some(raw) => Some(RequestStatus::parse(&raw)?),
                None => None,
            };
            let settings = load_global_settings().map_err(|err| err.to_string())?;
            list_requests(&settings, status)
        }
        "show" => {
            let request_id = args.next().ok_or("show requires a request id")?;
            let settings = load_global_settings().map_err(|err| err.to_string())?;
            show_request(&settings, &request_id)
        }
        "help" | "--help" | "-h" => Ok(USAGE.to_string()),
        other => Err(format!("unknown command `{other}`\n{USAGE}")),
    }
}

fn init_settings() -> Result<String, String> {
    let path = default_settings_path().map_err(|err| err.to_string())?;
    if path.exists() {
        return Err(format!("settings already exist at {}", path.display()));
    }
    let settings = Settings {
        state_root: default_state_root().map_err(|err| err.to_string())?,
        directory: Default::default(),
        notifications: Default::default(),
        dedup: Default::default(),
    };
    let written = save_settings(&settings).map_err(|err| err.to_string())?;
    Ok(format!("wrote default settings to {}", written.display()))
}

fn open_store(settings: &Settings) -> Result<RequestStore, String> {
    let store = RequestStore::open(&request_database_path(&settings.state_root))
        .map_err(|err| err.to_string())?;
    store.ensure_schema().map_err(|err| err.to_string())?;
    Ok(store)
}

fn handle_event_file(settings: &Settings, path: &str) -> Result<String, String> {
    let raw = fs::read_to_string(path).map_err(|err| format!("failed to read {path}: {err}"))?;
    let event: InboundEvent =
        serde_json::from_str(&raw).map_err(|err| format!("invalid event in {path}: {err}"))?;

    let store = open_store(settings)?;
    let directory = DirectoryApiClient::new(&settings.directory);
    let sink = WebhookSink::new(&settings.notifications);
    let notifier = Notifier::new(
        &sink,
        &settings.notifications.audit_channel,
        &settings.notifications.approvers_channel,
        settings.state_root.clone(),
    );
    let handler = EventHandler {
        store: &store,
        directory: &directory,
        notifier: &notifier,
        classifier: &KeywordClassifier,
        state_root: &settings.state_root,
        dedup_ttl_secs: settings.dedup.ttl_secs,
    };

    let now = chrono::Utc::now().timestamp();
    let ack = handler
        .handle_event(&event, now)
        .map_err(|err| err.to_string())?;
    Ok(match ack {
        Ack::Processed => "processed".to_string(),
        Ack::Duplicate => "duplicate delivery; ignored".to_string(),
        Ack::Ignored(reason) => format!("ignored: {reason}"),
    })
}

fn list_requests(settings: &Settings, status: Option<RequestStatus>) -> Result<String, String> {
    let store = open_store(settings)?;
    let records = store
        .scan_by(&ScanFilter {
            status,
            limit: Some(50),
        })
        .map_err(|err| err.to_string())?;

    if records.is_empty() {
        return Ok("no requests".to_string());
    }
    let lines: Vec<String> = records.iter().map(render_summary_line).collect();
    Ok(lines.join("\n"))
}

fn render_summary_line(record: &RequestRecord) -> String {
    format!(
        "{}  {}  {}  {} -> {}",
        record.request_id,
        record.status,
        record.kind,
        record.subject_identity,
        record.target_resource
    )
}

fn show_request(settings: &Settings, request_id: &str) -> Result<String, String> {
    let store = open_store(settings)?;
    let record = store
        .get(request_id)
        .map_err(|err| err.to_string())?
        .ok_or_else(|| format!("no request with id `{request_id}`"))?;
    serde_json::to_string_pretty(&record).map_err(|err| err.to_string())
}
