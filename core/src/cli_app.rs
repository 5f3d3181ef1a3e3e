use crate::catalog::{Catalog, Event, Listing};
use crate::config::Config;
use crate::filter::{distinct_values, filter, Field, FilterCriteria};
use crate::kv::SledKv;
use crate::message_store::MessageStore;
use crate::messenger_types::UserId;
use crate::profile_store::{Profile, ProfileStore};
use crate::watchlist::Watchlist;
use colored::*;
use std::fs;
use tracing::debug;

const BIN: &str = "commonplace";

/// Open stores under the configured data dir and dispatch one command
pub fn run(config: Config) -> anyhow::Result<()> {
    if !config.color {
        colored::control::set_override(false);
    }

    let args = &config.command;
    if args.is_empty() {
        print_usage();
        return Ok(());
    }

    fs::create_dir_all(&config.data_dir)?;
    let kv = SledKv::open(&config.data_dir)?;
    debug!("Running {:?} against {:?}", args, config.data_dir);

    let messages = MessageStore::new(kv.clone());
    let profiles = ProfileStore::new(kv.clone());
    let watchlist = Watchlist::new(kv);

    match args[0].as_str() {
        "send" => {
            if args.len() < 4 {
                usage_hint("send <from> <to> <message>");
                return Ok(());
            }
            let from = user_id(&args[1]);
            let to = user_id(&args[2]);
            let text = args[3..].join(" ");
            match messages.send(&from, &to, &text)? {
                Some(msg) => println!(
                    "{} Message sent to {} (id {})",
                    "✓".green().bold(),
                    to.to_string().cyan(),
                    msg.id.to_string().dimmed()
                ),
                None => eprintln!("{}", "✗ Message is empty, nothing sent".yellow()),
            }
        }
        "thread" => {
            if args.len() < 3 {
                usage_hint("thread <user_a> <user_b>");
                return Ok(());
            }
            show_thread(&messages, &user_id(&args[1]), &user_id(&args[2]));
        }
        "inbox" => {
            if args.len() < 2 {
                usage_hint("inbox <user>");
                return Ok(());
            }
            let me = user_id(&args[1]);
            show_inbox(&messages, &profiles, &me);
        }
        "profile" => profile_command(&profiles, &args[1..])?,
        "listings" => {
            let catalog = Catalog::load(&config.data_dir)?;
            let criteria = parse_criteria(&args[1..]);
            let hits = filter(&catalog.listings, &criteria);
            print_listings(&hits);
        }
        "events" => {
            let catalog = Catalog::load(&config.data_dir)?;
            let criteria = parse_criteria(&args[1..]);
            let hits = filter(&catalog.events, &criteria);
            print_events(&hits);
        }
        "options" => {
            if args.len() < 3 {
                usage_hint("options <listings|events> <category|location|...>");
                return Ok(());
            }
            let Some(field) = Field::parse(&args[2]) else {
                eprintln!("{} Unknown field: {}", "✗".red().bold(), args[2].red());
                return Ok(());
            };
            let catalog = Catalog::load(&config.data_dir)?;
            let values = match args[1].as_str() {
                "listings" => distinct_values(&catalog.listings, field),
                "events" => distinct_values(&catalog.events, field),
                other => {
                    eprintln!("{} Unknown collection: {}", "✗".red().bold(), other.red());
                    return Ok(());
                }
            };
            for v in values {
                println!("  {}", v.cyan());
            }
        }
        "watch" => {
            if args.len() < 3 {
                usage_hint("watch <user> <listing_id>");
                return Ok(());
            }
            let user = user_id(&args[1]);
            let Ok(listing_id) = args[2].parse::<u64>() else {
                eprintln!("{} Listing id must be a number", "✗".red().bold());
                return Ok(());
            };
            if watchlist.toggle(&user, listing_id)? {
                println!("{} Watching listing {}", "★".yellow(), listing_id);
            } else {
                println!("{} Stopped watching listing {}", "☆".dimmed(), listing_id);
            }
        }
        "watchlist" => {
            if args.len() < 2 {
                usage_hint("watchlist <user>");
                return Ok(());
            }
            let catalog = Catalog::load(&config.data_dir)?;
            let watched = watchlist.watched_listings(&user_id(&args[1]), &catalog.listings);
            print_listings(&watched);
        }
        other => {
            eprintln!("{} Unknown command: {}", "✗".red().bold(), other.red());
            print_usage();
        }
    }

    Ok(())
}

fn user_id(s: &str) -> UserId {
    match s.parse::<UserId>() {
        Ok(id) => id,
        Err(never) => match never {},
    }
}

/// `--search foo --category bar` style flags into criteria
fn parse_criteria(args: &[String]) -> FilterCriteria {
    let mut criteria = FilterCriteria::new();
    let mut i = 0;
    while i < args.len() {
        let name = args[i].trim_start_matches("--");
        let value = args.get(i + 1).map(String::as_str).unwrap_or("");
        if !criteria.set(name, value) {
            eprintln!("{} Ignoring unknown filter: {}", "!".yellow(), args[i].yellow());
        }
        i += 2;
    }
    criteria
}

fn show_thread<K: crate::kv::KvStore>(store: &MessageStore<K>, a: &UserId, b: &UserId) {
    let mut thread = store.thread(a, b);
    if thread.is_empty() {
        println!("{}", "No messages yet".yellow());
        return;
    }
    thread.sort_by_key(|m| m.timestamp);

    println!(
        "{}",
        format!("Conversation {} ↔ {} ({})", a, b, thread.len())
            .bright_cyan()
            .bold()
    );
    println!("{}", "─".repeat(60).dimmed());
    for m in thread {
        println!(
            "  {} {} {}",
            m.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            format!("{}:", m.sender_id).green(),
            m.text
        );
    }
}

fn show_inbox<K: crate::kv::KvStore>(
    messages: &MessageStore<K>,
    profiles: &ProfileStore<K>,
    me: &UserId,
) {
    let others = profiles.others(me);
    let convs = messages.list_conversations_for(me, &others);
    if convs.is_empty() {
        println!("{}", "No conversations yet".yellow());
        return;
    }

    println!(
        "{}",
        format!("Conversations ({})", convs.len()).bright_cyan().bold()
    );
    println!("{}", "─".repeat(60).dimmed());
    for c in convs {
        let name = profiles
            .get(&c.other_user)
            .map(|p| p.name)
            .unwrap_or_else(|| c.other_user.to_string());
        println!(
            "  {} [{}] {} {}",
            name.cyan(),
            c.message_count,
            c.last_message.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            preview(&c.last_message.text)
        );
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 40;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX).collect();
        format!("{}…", cut)
    }
}

fn profile_command<K: crate::kv::KvStore>(
    profiles: &ProfileStore<K>,
    args: &[String],
) -> anyhow::Result<()> {
    match args.first().map(String::as_str) {
        Some("set") if args.len() >= 3 => {
            let id = user_id(&args[1]);
            let mut profile = profiles
                .get(&id)
                .unwrap_or_else(|| Profile::new(id.clone(), args[2].clone()));
            profile.name = args[2].clone();
            if let Some(location) = args.get(3) {
                profile.location = Some(location.clone());
            }
            profiles.save(profile)?;
            println!("{} Saved profile {}", "✓".green().bold(), id.to_string().cyan());
        }
        Some("list") => {
            let all = profiles.all();
            if all.is_empty() {
                println!("{}", "No profiles yet".yellow());
            }
            for p in all {
                println!(
                    "  {} {} {}",
                    p.id.to_string().dimmed(),
                    p.name.cyan(),
                    p.location.unwrap_or_default().green()
                );
            }
        }
        _ => usage_hint("profile set <id> <name> [location] | profile list"),
    }
    Ok(())
}

fn print_listings(listings: &[&Listing]) {
    if listings.is_empty() {
        println!("{}", "No listings found".yellow());
        return;
    }
    println!(
        "{}",
        format!("Listings ({})", listings.len()).bright_cyan().bold()
    );
    println!("{}", "─".repeat(60).dimmed());
    for l in listings {
        println!(
            "  {} {} [{}] @ {} by {}",
            l.id.to_string().dimmed(),
            l.title.cyan(),
            l.category.as_deref().unwrap_or("?"),
            l.location.as_deref().unwrap_or("?").green(),
            l.helper.as_deref().unwrap_or("?")
        );
    }
}

fn print_events(events: &[&Event]) {
    if events.is_empty() {
        println!("{}", "No events found".yellow());
        return;
    }
    println!("{}", format!("Events ({})", events.len()).bright_cyan().bold());
    println!("{}", "─".repeat(60).dimmed());
    for e in events {
        println!(
            "  {} {} {} {} @ {} ({} going)",
            e.id.to_string().dimmed(),
            e.date.as_deref().unwrap_or("?").yellow(),
            e.time.as_deref().unwrap_or(""),
            e.title.cyan(),
            e.location.as_deref().unwrap_or("?").green(),
            e.attendees.len()
        );
    }
}

fn usage_hint(usage: &str) {
    eprintln!("{}", format!("Usage: {} {}", BIN, usage).yellow());
}

fn print_usage() {
    println!("{}", "Commonplace CLI".bright_cyan().bold());
    println!();
    println!("{}", "Usage:".bright_white().bold());
    println!("  {} [--data-dir <path>] [--no-color] <command> [args]", BIN.cyan());
    println!();
    println!("{}", "Commands:".bright_white().bold());
    println!("  {} <from> <to> <message>     Send a message", "send".cyan());
    println!("  {} <a> <b>                 Show a conversation", "thread".cyan());
    println!("  {} <user>                   List conversations, newest first", "inbox".cyan());
    println!(
        "  {} set <id> <name> [loc]   Create or update a profile",
        "profile".cyan()
    );
    println!("  {} list                   List profiles", "profile".cyan());
    println!(
        "  {} [--search s] [--category c] [--location l]",
        "listings".cyan()
    );
    println!(
        "  {} [--search s] [--category c] [--location l] [--date d]",
        "events".cyan()
    );
    println!(
        "  {} <listings|events> <field>  Distinct values of a field",
        "options".cyan()
    );
    println!("  {} <user> <listing_id>     Toggle a watched listing", "watch".cyan());
    println!("  {} <user>               Show watched listings", "watchlist".cyan());
}
