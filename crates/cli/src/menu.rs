//! Interactive menu loop.
//!
//! Reads numbered choices line by line and renders listings, details and
//! recommendations. Generic over its input and output so it can be driven
//! by a script in tests.

use std::io::{BufRead, Write};

use anyhow::Result;
use colored::Colorize;
use tracing::warn;

use catalogue::MovieRecord;
use session::{BrowseMode, Session};
use similarity::SimilarityProvider;

/// Column at which descriptions are wrapped
pub const WRAP_WIDTH: usize = 70;

/// One line of user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Number(i64),
    Invalid,
    Eof,
}

/// Whether the main loop keeps running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// What the user picked from a recommendation list
enum PlayAction {
    Back,
    Play(MovieRecord),
    Quit,
}

/// Second line shown under each entry of a listing
#[derive(Debug, Clone, Copy)]
enum ListStyle {
    Genre,
    Director,
}

pub struct Menu<'a, P, R, W> {
    session: &'a Session<P>,
    input: R,
    output: W,
}

impl<'a, P, R, W> Menu<'a, P, R, W>
where
    P: SimilarityProvider + 'static,
    R: BufRead,
    W: Write,
{
    pub fn new(session: &'a Session<P>, input: R, output: W) -> Self {
        Self {
            session,
            input,
            output,
        }
    }

    /// Run until the user exits or input ends
    pub async fn run(&mut self) -> Result<()> {
        writeln!(self.output, "{}", "Home Cinema".bold())?;

        loop {
            write!(
                self.output,
                "Choose from the menu options below:\n1. Browse movies\n2. Search movies\n0. Exit\n"
            )?;
            let flow = match self.read_choice()? {
                Choice::Number(1) => self.browse().await,
                Choice::Number(2) => self.search().await,
                Choice::Number(0) | Choice::Eof => break,
                _ => {
                    writeln!(self.output, "Invalid menu selection.\n")?;
                    continue;
                }
            };

            match flow {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => {
                    warn!("Menu action failed: {:#}", e);
                    writeln!(self.output, "Unable to load movie catalogue.\n")?;
                }
            }
        }

        writeln!(self.output, "You have been logged out.")?;
        Ok(())
    }

    async fn browse(&mut self) -> Result<Flow> {
        writeln!(
            self.output,
            "Press 1 to browse by genre, 2 to browse by director or 3 to browse new releases"
        )?;
        let (mode, style, heading) = match self.read_choice()? {
            Choice::Number(1) => (BrowseMode::Genre, ListStyle::Genre, "Browse by genre"),
            Choice::Number(2) => (BrowseMode::Director, ListStyle::Director, "Browse by director"),
            Choice::Number(3) => (BrowseMode::NewReleases, ListStyle::Genre, "Browse new releases"),
            Choice::Eof => return Ok(Flow::Quit),
            _ => return Ok(Flow::Continue),
        };
        writeln!(self.output, "{}\n", heading.bold())?;

        let movies = self.session.browse(mode).await?;
        if movies.is_empty() {
            return Ok(Flow::Continue);
        }
        self.select(&movies, style).await
    }

    async fn search(&mut self) -> Result<Flow> {
        write!(self.output, "Search: ")?;
        self.output.flush()?;
        let Some(query) = self.read_line()? else {
            return Ok(Flow::Quit);
        };

        let movies = self.session.search(query.trim()).await?;
        if movies.is_empty() {
            writeln!(self.output, "Your search returned 0 results.\n")?;
            return Ok(Flow::Continue);
        }
        writeln!(self.output, "Your search returned {} result(s):", movies.len())?;
        self.select(&movies, ListStyle::Genre).await
    }

    /// Pick from a listing, view details, optionally play
    async fn select(&mut self, movies: &[MovieRecord], style: ListStyle) -> Result<Flow> {
        loop {
            self.print_list(movies, style)?;
            writeln!(
                self.output,
                "Enter movie number to view details or 0 to return to the main menu"
            )?;

            let n = match self.read_choice()? {
                Choice::Number(n) => n,
                Choice::Eof => return Ok(Flow::Quit),
                Choice::Invalid => {
                    writeln!(self.output, "Error\n")?;
                    return Ok(Flow::Continue);
                }
            };
            let Some(movie) = pick(movies, n) else {
                if n != 0 {
                    writeln!(self.output, "Error\n")?;
                }
                return Ok(Flow::Continue);
            };

            self.print_details(movie)?;
            writeln!(
                self.output,
                "Press 1 to play movie, -1 to go back or 0 to return to the main menu"
            )?;
            match self.read_choice()? {
                Choice::Number(1) => {
                    if self.play(movie.clone()).await? == Flow::Quit {
                        return Ok(Flow::Quit);
                    }
                }
                Choice::Number(-1) => continue,
                Choice::Number(0) => return Ok(Flow::Continue),
                Choice::Eof => return Ok(Flow::Quit),
                _ => {
                    writeln!(self.output, "Error\n")?;
                    return Ok(Flow::Continue);
                }
            }
        }
    }

    /// Play a movie and walk its recommendations.
    ///
    /// Each play pushes a recommendation list; going back pops it, so the
    /// user can chain plays and unwind them one at a time.
    async fn play(&mut self, movie: MovieRecord) -> Result<Flow> {
        let mut stack: Vec<Vec<MovieRecord>> = Vec::new();
        if let Some(list) = self.recommend(&movie).await? {
            stack.push(list);
        }

        while let Some(list) = stack.last().cloned() {
            match self.pick_recommendation(&list)? {
                PlayAction::Back => {
                    stack.pop();
                }
                PlayAction::Play(next) => {
                    if let Some(list) = self.recommend(&next).await? {
                        stack.push(list);
                    }
                }
                PlayAction::Quit => return Ok(Flow::Quit),
            }
        }
        Ok(Flow::Continue)
    }

    /// Print the recommendation header and list. `None` when nothing can
    /// be shown.
    async fn recommend(&mut self, movie: &MovieRecord) -> Result<Option<Vec<MovieRecord>>> {
        let recommendations = match self.session.play(movie).await {
            Ok(list) => list,
            Err(e) => {
                warn!("Recommendation failed: {:#}", e);
                writeln!(self.output, "Unable to recommend movies for {}.\n", movie.title)?;
                return Ok(None);
            }
        };

        writeln!(self.output)?;
        writeln!(
            self.output,
            "Did you enjoy {}? You might also like:",
            movie.title.bold()
        )?;
        if recommendations.is_empty() {
            writeln!(self.output, "No other movies in the catalogue.\n")?;
            return Ok(None);
        }
        Ok(Some(recommendations))
    }

    fn pick_recommendation(&mut self, movies: &[MovieRecord]) -> Result<PlayAction> {
        loop {
            self.print_list(movies, ListStyle::Genre)?;
            writeln!(self.output, "Enter movie number to view details or -1 to go back")?;

            let n = match self.read_choice()? {
                Choice::Number(n) => n,
                Choice::Eof => return Ok(PlayAction::Quit),
                Choice::Invalid => {
                    writeln!(self.output, "Error\n")?;
                    continue;
                }
            };
            if n == -1 {
                return Ok(PlayAction::Back);
            }
            let Some(movie) = pick(movies, n) else {
                writeln!(self.output, "Error\n")?;
                continue;
            };

            self.print_details(movie)?;
            writeln!(self.output, "Press 1 to play movie or -1 to go back")?;
            match self.read_choice()? {
                Choice::Number(1) => return Ok(PlayAction::Play(movie.clone())),
                Choice::Number(-1) => continue,
                Choice::Eof => return Ok(PlayAction::Quit),
                _ => writeln!(self.output, "Error\n")?,
            }
        }
    }

    // Rendering

    fn print_list(&mut self, movies: &[MovieRecord], style: ListStyle) -> Result<()> {
        for (count, movie) in movies.iter().enumerate() {
            let second = match style {
                ListStyle::Genre => &movie.genre,
                ListStyle::Director => &movie.director,
            };
            writeln!(
                self.output,
                "{} {} ({})\n{}\n",
                (count + 1).to_string().green(),
                movie.title,
                movie.year,
                second
            )?;
        }
        Ok(())
    }

    fn print_details(&mut self, movie: &MovieRecord) -> Result<()> {
        writeln!(self.output, "{}", movie)?;
        writeln!(self.output, "{}\n", wrap_text(&movie.description, WRAP_WIDTH))?;
        Ok(())
    }

    // Input

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn read_choice(&mut self) -> Result<Choice> {
        Ok(match self.read_line()? {
            None => Choice::Eof,
            Some(line) => match line.trim().parse::<i64>() {
                Ok(n) => Choice::Number(n),
                Err(_) => Choice::Invalid,
            },
        })
    }
}

/// 1-based menu number to list entry
fn pick(movies: &[MovieRecord], n: i64) -> Option<&MovieRecord> {
    usize::try_from(n)
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|idx| movies.get(idx))
}

/// Greedy word wrap; words longer than `width` get a line to themselves
pub fn wrap_text(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalogue::Catalogue;
    use engine::RecommendationEngine;
    use similarity::TermVectorProvider;
    use std::io::Cursor;
    use std::sync::Arc;

    fn movie(id: &str, title: &str, director: &str, year: i32, description: &str, genre: &str) -> MovieRecord {
        MovieRecord {
            id: id.to_string(),
            title: title.to_string(),
            director: director.to_string(),
            year,
            description: description.to_string(),
            genre: genre.to_string(),
            tags: title.to_lowercase(),
        }
    }

    async fn build_session() -> Session<TermVectorProvider> {
        let catalogue = Catalogue::open_in_memory().await.unwrap();
        catalogue
            .insert_records(&[
                movie("M001", "Alien", "Ridley Scott", 1979, "A spaceship crew is hunted by a deadly alien creature.", "Sci-Fi Horror"),
                movie("M002", "Event Horizon", "Paul Anderson", 1997, "A rescue crew boards a spaceship that returned from hell.", "Sci-Fi Horror"),
                movie("M003", "Amelie", "Jean-Pierre Jeunet", 2001, "A shy waitress in Paris secretly helps others find love.", "Romance Comedy"),
            ])
            .await
            .unwrap();
        Session::new(
            catalogue,
            RecommendationEngine::new(Arc::new(TermVectorProvider::new())),
        )
    }

    async fn run_script(script: &str) -> String {
        colored::control::set_override(false);
        let session = build_session().await;
        let mut output = Vec::new();
        Menu::new(&session, Cursor::new(script.as_bytes().to_vec()), &mut output)
            .run()
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("one two three", 7), "one two\nthree");
        assert_eq!(wrap_text("  spaced   out  ", 70), "spaced out");
        assert_eq!(wrap_text("", 70), "");
        assert_eq!(wrap_text("tiny enormousword", 5), "tiny\nenormousword");
    }

    #[test]
    fn test_pick_is_one_based() {
        let movies = vec![movie("M001", "A", "B", 2000, "C", "D")];
        assert_eq!(pick(&movies, 1).map(|m| m.id.as_str()), Some("M001"));
        assert!(pick(&movies, 0).is_none());
        assert!(pick(&movies, 2).is_none());
        assert!(pick(&movies, -1).is_none());
    }

    #[tokio::test]
    async fn test_exit_immediately() {
        let out = run_script("0\n").await;
        assert!(out.starts_with("Home Cinema"));
        assert!(out.ends_with("You have been logged out.\n"));
    }

    #[tokio::test]
    async fn test_invalid_main_menu_choice() {
        let out = run_script("x\n7\n0\n").await;
        assert_eq!(out.matches("Invalid menu selection.").count(), 2);
    }

    #[tokio::test]
    async fn test_search_with_no_results() {
        let out = run_script("2\nzzz\n0\n").await;
        assert!(out.contains("Your search returned 0 results."));
    }

    #[tokio::test]
    async fn test_search_details_and_play() {
        // Search, open the first hit, play it, back out of the
        // recommendations, return to the main menu and exit.
        let out = run_script("2\nalien\n1\n1\n-1\n0\n0\n").await;

        assert!(out.contains("Your search returned 1 result(s):"));
        assert!(out.contains("Alien (1979)\nDirected by Ridley Scott"));
        assert!(out.contains("Did you enjoy Alien? You might also like:"));

        let recommendations = out
            .split("You might also like:")
            .nth(1)
            .unwrap();
        let horizon = recommendations.find("Event Horizon").unwrap();
        let amelie = recommendations.find("Amelie").unwrap();
        assert!(amelie < horizon, "weakest recommendation is listed first");
    }

    #[tokio::test]
    async fn test_chained_play_from_recommendations() {
        // Browse new releases, pick Amelie (newest), play it, pick the
        // strongest recommendation (2) and play that too, then unwind.
        let out = run_script("1\n3\n1\n1\n2\n1\n-1\n-1\n0\n0\n").await;

        assert!(out.contains("Browse new releases"));
        assert!(out.contains("Did you enjoy Amelie?"));
        assert_eq!(out.matches("Did you enjoy").count(), 2);
        assert!(out.ends_with("You have been logged out.\n"));
    }

    #[tokio::test]
    async fn test_browse_by_director_shows_directors() {
        let out = run_script("1\n2\n0\n0\n").await;
        assert!(out.contains("Browse by director"));
        assert!(out.contains("1 Event Horizon (1997)\nPaul Anderson"));
    }

    #[tokio::test]
    async fn test_end_of_input_logs_out() {
        let out = run_script("1\n1\n").await;
        assert!(out.ends_with("You have been logged out.\n"));
    }
}
