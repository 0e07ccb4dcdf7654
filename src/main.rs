use std::io::{self, BufRead, Write};
use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cet4_cards::content::Catalog;
use cet4_cards::db::{MemoryStorage, SqliteStorage, Storage};
use cet4_cards::domain::{Language, WordRecord, WordStatus};
use cet4_cards::session::Direction;
use cet4_cards::speech::{self, LogSpeaker, Speaker};
use cet4_cards::srs::{self, Ordering};
use cet4_cards::store::{StudyStore, SystemClock};
use cet4_cards::config;

type Store<'c> = StudyStore<'c, Box<dyn Storage>>;

enum Command {
  List,
  Day(i64),
  Mark(WordStatus, Option<String>),
  Clear(Option<u32>),
  Reset,
  Order(Ordering),
  Focus(Direction),
  Show(Option<String>),
  Lookup(String),
  Link(String),
  Search(String),
  Stats(Option<u32>),
  Export,
  Say(String),
  Pronounce(bool),
  Sentence(Option<usize>),
  Lang(Language),
  Speed(f32),
  Help,
  Quit,
}

impl FromStr for Command {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (head, rest) = match s.split_once(char::is_whitespace) {
      Some((head, rest)) => (head, rest.trim()),
      None => (s, ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    match head {
      "list" | "ls" => Ok(Command::List),
      "day" => rest
        .parse()
        .map(Command::Day)
        .map_err(|_| format!("'{}' is not a day number", rest)),
      "mark" => {
        let (status, target) = match rest.split_once(char::is_whitespace) {
          Some((status, target)) => (status, Some(target.trim().to_string())),
          None => (rest, None),
        };
        WordStatus::from_str(status)
          .map(|s| Command::Mark(s, target))
          .ok_or_else(|| "usage: mark known|unknown|unset [word]".to_string())
      }
      "g" | "r" | "w" => WordStatus::from_str(head)
        .map(|s| Command::Mark(s, arg))
        .ok_or_else(|| "unreachable status shortcut".to_string()),
      "clear" => match arg {
        None => Ok(Command::Clear(None)),
        Some(g) => g
          .parse()
          .map(|g| Command::Clear(Some(g)))
          .map_err(|_| format!("'{}' is not a group number", g)),
      },
      "reset" => Ok(Command::Reset),
      "shuffle" | "shuffle-groups" | "sort" | "order" => Ordering::from_str(head)
        .map(Command::Order)
        .ok_or_else(|| format!("unknown ordering '{}'", head)),
      "focus" | "h" | "j" | "k" | "l" => {
        let dir = if head == "focus" { rest } else { head };
        Direction::from_str(dir)
          .map(Command::Focus)
          .ok_or_else(|| "usage: focus left|right|up|down".to_string())
      }
      "show" => Ok(Command::Show(arg)),
      "lookup" => arg.map(Command::Lookup).ok_or_else(|| "usage: lookup <token>".to_string()),
      "link" => arg.map(Command::Link).ok_or_else(|| "usage: link <text>".to_string()),
      "search" | "/" => arg.map(Command::Search).ok_or_else(|| "usage: search <query>".to_string()),
      "stats" => match arg {
        None => Ok(Command::Stats(None)),
        Some(g) => g
          .parse()
          .map(|g| Command::Stats(Some(g)))
          .map_err(|_| format!("'{}' is not a group number", g)),
      },
      "export" => Ok(Command::Export),
      "pronounce" | "p" => match rest {
        "" => Ok(Command::Pronounce(false)),
        "slow" => Ok(Command::Pronounce(true)),
        _ => Err("usage: pronounce [slow]".to_string()),
      },
      "sentence" => match arg {
        None => Ok(Command::Sentence(None)),
        Some(level) => match level.parse() {
          Ok(n @ 1..=3) => Ok(Command::Sentence(Some(n))),
          _ => Err("usage: sentence [1|2|3]".to_string()),
        },
      },
      "say" => arg.map(Command::Say).ok_or_else(|| "usage: say <text>".to_string()),
      "lang" => Language::from_str(rest)
        .map(Command::Lang)
        .ok_or_else(|| "usage: lang cn|en".to_string()),
      "speed" => rest
        .parse()
        .map(Command::Speed)
        .map_err(|_| "usage: speed <rate>".to_string()),
      "help" | "?" => Ok(Command::Help),
      "quit" | "q" | "exit" => Ok(Command::Quit),
      _ => Err(format!("unknown command '{}'", head)),
    }
  }
}

fn help() {
  println!("Commands:");
  println!("  list                      show the active words");
  println!("  day <n>                   switch review day (cumulative)");
  println!("  mark known|unknown|unset [word]   (shortcuts: g, r, w)");
  println!("  clear [group]             clear statuses (all or one group)");
  println!("  reset                     reset all progress, keep settings");
  println!("  shuffle | shuffle-groups | sort | order");
  println!("  focus left|right|up|down  move the cursor (h/j/k/l)");
  println!("  show [word]               show a card (default: focused)");
  println!("  lookup <token>            resolve a word form to the catalog");
  println!("  link <text>               link words of a sentence to the catalog");
  println!("  search <query>            search words and translations");
  println!("  stats [group]             progress statistics");
  println!("  export                    list words marked unknown");
  println!("  say <text>                pronounce text");
  println!("  pronounce [slow]          pronounce the focused word");
  println!("  sentence [1|2|3]          read the focused example (1 slowest)");
  println!("  lang cn|en                display language");
  println!("  speed <rate>              speech rate (0.1 to 2.0)");
  println!("  quit");
}

fn status_marker(status: WordStatus) -> char {
  match status {
    WordStatus::Known => '+',
    WordStatus::Unknown => '-',
    WordStatus::Unset => '.',
  }
}

/// Find a word by id first, then by text (with suffix stripping).
fn find_word<'c>(store: &Store<'c>, target: &str) -> Option<&'c WordRecord> {
  store.catalog().get(target).or_else(|| store.resolve(target))
}

fn print_list(store: &Store<'_>) {
  let focus = store.view().focus();
  let grouped = store_is_catalog_grouped(store);
  let mut current_group = None;

  for (i, word) in store.active_words().iter().enumerate() {
    if grouped && current_group != Some(word.group_number) {
      let stats = store.group_stats(word.group_number);
      println!(
        "-- group {} ({} known, {} unknown, {} words)",
        stats.group, stats.known, stats.unknown, stats.total
      );
      current_group = Some(word.group_number);
    }
    let cursor = if focus == Some(i) { '>' } else { ' ' };
    println!(
      "{}{:>4} {} {}",
      cursor,
      i + 1,
      status_marker(store.status_of(&word.id)),
      word.word
    );
  }
  println!("day {}/{}, {} words", store.state().current_day, store.max_day(), store.active_words().len());
}

/// Group headers only make sense while groups are contiguous.
fn store_is_catalog_grouped(store: &Store<'_>) -> bool {
  store
    .active_words()
    .windows(2)
    .all(|pair| pair[0].group_number <= pair[1].group_number)
}

fn print_card(store: &Store<'_>, word: &WordRecord) {
  let example: String = store
    .catalog()
    .highlighted_example(word)
    .iter()
    .map(|seg| {
      if seg.highlighted {
        format!("[{}]", seg.text)
      } else {
        seg.text.to_string()
      }
    })
    .collect();

  let synonyms: Vec<String> = word
    .synonyms
    .iter()
    .map(|syn| match store.resolve(syn) {
      Some(_) => format!("{}*", syn),
      None => syn.clone(),
    })
    .collect();

  println!("{}  {}  {}", word.word, word.ipa, word.part_of_speech);
  println!("  {}", word.chinese);
  if !example.is_empty() {
    println!("  \"{}\"", example);
  }
  if !synonyms.is_empty() {
    println!("  synonyms: {}", synonyms.join(", "));
  }
  println!(
    "  status: {}, marked unknown {} time(s), group {}",
    store.status_of(&word.id),
    store.state().red_count(&word.id),
    word.group_number
  );
}

fn print_stats(store: &Store<'_>, group: Option<u32>) {
  if let Some(group) = group {
    let stats = store.group_stats(group);
    println!(
      "group {}: {} words, {} known, {} unknown, {} unset",
      stats.group,
      stats.total,
      stats.known,
      stats.unknown,
      stats.unset()
    );
    for word in srs::group_words(store.catalog(), group) {
      println!("  {} {}", status_marker(store.status_of(&word.id)), word.word);
    }
    return;
  }

  let state = store.state();
  let overall = srs::overall_stats(store.catalog(), state);
  println!(
    "{} words, {} reviewed, {} known ({}), {} unknown",
    overall.total,
    overall.reviewed(),
    overall.known,
    srs::format_percent(overall.known, overall.total),
    overall.unknown
  );
  println!("streak: {} day(s)", state.streak);

  let hardest = srs::default_hardest_words(store.catalog(), state);
  if !hardest.is_empty() {
    println!("hardest words:");
    for (word, count) in hardest {
      println!("  {:<16} {}x", word.word, count);
    }
  }

  let history = srs::recent_history(state, config::HISTORY_DAYS);
  if !history.is_empty() {
    println!("recent days:");
    for day in history {
      println!(
        "  {}  {} known, {} unknown ({} reviewed)",
        day.date, day.known_count, day.unknown_count, day.total_reviewed
      );
    }
  }

  for stats in store.all_group_stats() {
    println!(
      "  group {:>3}: {:>3} known {:>3} unknown / {}",
      stats.group, stats.known, stats.unknown, stats.total
    );
  }
}

/// Returns false when the session should end.
fn execute(store: &mut Store<'_>, speaker: &dyn Speaker, command: Command) -> bool {
  match command {
    Command::List => print_list(store),
    Command::Day(n) => {
      let day = store.set_day(n);
      println!("day {} ({} words)", day, store.active_words().len());
    }
    Command::Mark(status, target) => {
      let word = match target {
        Some(t) => find_word(store, &t),
        None => store.view().focused(),
      };
      match word {
        Some(word) => {
          store.set_word_status(&word.id, status);
          println!("{} -> {}", word.word, status);
        }
        None => println!("no such word (focus one or name it)"),
      }
    }
    Command::Clear(None) => {
      store.clear_all_statuses();
      println!("all statuses cleared");
    }
    Command::Clear(Some(group)) => {
      store.clear_group_statuses(group);
      println!("group {} cleared", group);
    }
    Command::Reset => {
      store.reset_all();
      println!("progress reset");
    }
    Command::Order(ordering) => {
      store.apply_ordering(ordering);
      print_list(store);
    }
    Command::Focus(direction) => match store.view_mut().move_focus(direction) {
      Some(_) => {
        if let Some(word) = store.view().focused() {
          print_card(store, word);
        }
      }
      None => println!("nothing to focus"),
    },
    Command::Show(target) => {
      let word = match target {
        Some(t) => find_word(store, &t),
        None => store.view().focused(),
      };
      match word {
        Some(word) => {
          store.view_mut().focus_word(&word.id);
          print_card(store, word);
          speaker.speak(&word.word, store.state().settings.tts_speed);
        }
        None => println!("no such word"),
      }
    }
    Command::Lookup(token) => match store.resolve(&token) {
      Some(word) => println!("{} -> {} ({})", token, word.word, word.chinese),
      None => println!("{}: not in the word list", token),
    },
    Command::Link(text) => {
      let linked: String = store
        .catalog()
        .link_tokens(&text)
        .iter()
        .map(|seg| match seg.word {
          Some(word) => format!("{}<{}>", seg.text, word.word),
          None => seg.text.to_string(),
        })
        .collect();
      println!("{}", linked);
    }
    Command::Search(query) => {
      let results = store.catalog().search(&query, config::SEARCH_LIMIT);
      if results.is_empty() {
        println!("no results");
      }
      for word in results {
        println!("  {} {} - {}", status_marker(store.status_of(&word.id)), word.word, word.chinese);
      }
    }
    Command::Stats(group) => print_stats(store, group),
    Command::Export => {
      let lines = srs::unknown_word_lines(store.catalog(), store.state());
      if lines.is_empty() {
        println!("no words marked unknown");
      }
      for line in lines {
        println!("{}", line);
      }
    }
    Command::Say(text) => speaker.speak(&text, store.state().settings.tts_speed),
    Command::Pronounce(slow) => match store.view().focused() {
      Some(word) => speech::speak_word(speaker, &word.word, slow),
      None => println!("nothing focused"),
    },
    Command::Sentence(level) => match store.view().focused() {
      Some(word) if !word.example_sentence.is_empty() => {
        let rate = store.state().settings.tts_speed;
        let ms = speech::speak_sentence(speaker, &word.example_sentence, level, rate);
        println!("reading example (about {:.1}s)", ms as f64 / 1000.0);
      }
      Some(word) => println!("{} has no example sentence", word.word),
      None => println!("nothing focused"),
    },
    Command::Lang(language) => {
      store.set_language(language);
      println!("language: {}", language.as_str());
    }
    Command::Speed(rate) => {
      store.set_tts_speed(rate);
      println!("speech rate: {}", store.state().settings.tts_speed);
    }
    Command::Help => help(),
    Command::Quit => return false,
  }
  true
}

fn run_session(store: &mut Store<'_>, speaker: &dyn Speaker) -> io::Result<()> {
  let stdin = io::stdin();
  let mut lines = stdin.lock().lines();

  loop {
    print!("day {}> ", store.state().current_day);
    io::stdout().flush()?;

    let Some(line) = lines.next() else {
      break;
    };
    let line = line?;
    let input = line.trim();
    if input.is_empty() {
      continue;
    }

    match Command::from_str(input) {
      Ok(command) => {
        if !execute(store, speaker, command) {
          break;
        }
      }
      Err(e) => eprintln!("{}. Type 'help' for commands.", e),
    }
  }
  Ok(())
}

fn open_storage(ephemeral: bool) -> Box<dyn Storage> {
  if ephemeral {
    tracing::info!("Ephemeral session, progress will not be saved");
    return Box::new(MemoryStorage::new());
  }

  let path = config::load_storage_path();
  match SqliteStorage::open(&path) {
    Ok(storage) => Box::new(storage),
    Err(e) => {
      tracing::warn!("State store unavailable ({}), continuing in memory", e);
      Box::new(MemoryStorage::new())
    }
  }
}

fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cet4_cards=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
    .init();

  let ephemeral = std::env::args().any(|a| a == "--ephemeral");

  let catalog_path = config::load_catalog_path();
  let catalog = match Catalog::load(&catalog_path) {
    Ok(catalog) => catalog,
    Err(e) => {
      tracing::error!("{}", e);
      std::process::exit(1);
    }
  };

  let mut store = StudyStore::open(&catalog, open_storage(ephemeral), SystemClock);
  if !store.state().has_seen_instructions {
    help();
    store.mark_instructions_seen();
  }
  println!(
    "{} words, day {}/{}, streak {}",
    catalog.len(),
    store.state().current_day,
    store.max_day(),
    store.state().streak
  );

  let speaker = LogSpeaker;
  if let Err(e) = run_session(&mut store, &speaker) {
    tracing::error!("Session ended with an IO error: {}", e);
  }
}
