use std::fmt;

/// The two navigable views. Anything unrecognised lands on [`View::Battle`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum View {
    #[default]
    Battle,
    History,
}

impl View {
    pub fn resolve(path: &str) -> View {
        match path.trim_matches('/') {
            "history" => View::History,
            "battle" => View::Battle,
            other => {
                if !other.is_empty() {
                    log::debug!("unknown view {:?}, redirecting to battle", other);
                }
                View::Battle
            }
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            View::Battle => "battle",
            View::History => "history",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Battle => "Pokemon Battle",
            View::History => "Battle History",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_paths_resolve() {
        assert_eq!(View::resolve("history"), View::History);
        assert_eq!(View::resolve("/history/"), View::History);
        assert_eq!(View::resolve("battle"), View::Battle);
    }

    #[test]
    fn empty_and_unknown_paths_redirect_to_battle() {
        assert_eq!(View::resolve(""), View::Battle);
        assert_eq!(View::resolve("/"), View::Battle);
        assert_eq!(View::resolve("pokedex"), View::Battle);
    }

    #[test]
    fn titles() {
        assert_eq!(View::Battle.title(), "Pokemon Battle");
        assert_eq!(View::History.to_string(), "history");
    }
}
