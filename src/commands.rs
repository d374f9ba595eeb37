use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use bridgeus::{
    application::{
        credentials::credential_store,
        error::AppError,
        render::{preview_text, render},
    },
    config::{Command, LoginArgs, PreviewArgs, RenderArgs, RequestArgs, Settings},
    infra::{
        http::{ApiClient, RequestOptions, auth},
        session::SessionFile,
    },
};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

pub async fn execute(command: Command, settings: &Settings) -> Result<(), AppError> {
    match command {
        Command::Render(args) => run_render(args),
        Command::Preview(args) => run_preview(args),
        Command::Login(args) => run_login(args, settings).await,
        Command::Logout => run_logout(settings).await,
        Command::Whoami => run_whoami(settings).await,
        Command::Request(args) => run_request(args, settings).await,
    }
}

fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let raw = read_input(args.file.as_deref())?;
    print_json(&render(&raw))
}

fn run_preview(args: PreviewArgs) -> Result<(), AppError> {
    let raw = read_input(args.file.as_deref())?;
    println!("{}", preview_text(&raw, args.max_length));
    Ok(())
}

async fn run_login(args: LoginArgs, settings: &Settings) -> Result<(), AppError> {
    let password = match (args.password_file.as_deref(), args.password) {
        (Some(path), _) => read_file(path)?.lines().next().unwrap_or_default().to_string(),
        (None, Some(password)) => password,
        (None, None) => {
            return Err(AppError::validation(
                "password required (use --password-file or BRIDGEUS_PASSWORD)",
            ));
        }
    };

    let session = Session::open(settings).await?;
    let mut identity = auth::login(&session.client, &args.email, &password).await?;
    match auth::load_profile(&session.client).await {
        Ok(Some(profiled)) => identity = profiled,
        Ok(None) => {}
        Err(err) => warn!(error = %err, "profile unavailable; keeping sign-in identity"),
    }
    session.persist().await?;

    info!(email = %identity.email, "signed in");
    print_json(&identity)
}

async fn run_logout(settings: &Settings) -> Result<(), AppError> {
    let session = Session::open(settings).await?;
    let outcome = auth::logout(&session.client).await;
    session.persist().await?;
    outcome?;
    Ok(())
}

async fn run_whoami(settings: &Settings) -> Result<(), AppError> {
    let session = Session::open(settings).await?;
    let credential = session.client.store().current();
    match credential.identity {
        Some(identity) if credential.is_authenticated() => print_json(&identity),
        _ => Err(AppError::NotSignedIn),
    }
}

async fn run_request(args: RequestArgs, settings: &Settings) -> Result<(), AppError> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .map_err(|err| AppError::validation(format!("invalid method `{}`: {err}", args.method)))?;

    let body = match (args.body, args.body_file.as_deref()) {
        (Some(body), _) => Some(body),
        (None, Some(path)) => Some(read_file(path)?),
        (None, None) => None,
    };

    let mut options = RequestOptions::new(method);
    if let Some(body) = body {
        serde_json::from_str::<Value>(&body)
            .map_err(|err| AppError::validation(format!("request body is not JSON: {err}")))?;
        options = options.with_body(body);
    }
    if args.no_auth {
        options = options.without_auth();
    }

    let session = Session::open(settings).await?;
    let outcome = session.client.dispatch::<Value>(&args.path, options).await;
    session.persist().await?;

    print_json(&outcome?)
}

/// API client bound to the persisted session.
struct Session {
    file: SessionFile,
    client: ApiClient,
}

impl Session {
    async fn open(settings: &Settings) -> Result<Self, AppError> {
        let file = SessionFile::new(settings.session.path.clone());
        let store = credential_store();
        store.replace(file.load().await?);
        let client = ApiClient::new(&settings.api, store)?;
        Ok(Self { file, client })
    }

    async fn persist(&self) -> Result<(), AppError> {
        self.file.save(&self.client.store().current()).await?;
        Ok(())
    }
}

fn read_input(file: Option<&Path>) -> Result<String, AppError> {
    match file {
        Some(path) => read_file(path),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| AppError::input("<stdin>", source))?;
            Ok(buffer)
        }
    }
}

fn read_file(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::input(path.display().to_string(), source))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to render output: {err}")))?;
    println!("{out}");
    Ok(())
}
