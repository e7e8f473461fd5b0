//! Options-pattern configuration.
//!
//! A configuration value is built by applying an ordered list of mutators to
//! a baseline: either `O::default()` ([`parse`]) or a caller supplied value
//! ([`parse_with_defaults`]). Each mutator runs exactly once, in order, so a
//! later mutator wins when two touch the same field.
//!
//! Example
//! ```rust,ignore
//! #[derive(Default)]
//! struct ServerOptions { port: u16, verbose: bool }
//!
//! fn with_port(port: u16) -> impl FnOnce(&mut ServerOptions) {
//!     move |o| o.port = port
//! }
//!
//! let opts: ServerOptions = options::parse([with_port(8080)]);
//! ```

/// Anything that can mutate an options value of type `O`.
///
/// Implemented for every `FnOnce(&mut O)`, boxed mutators included.
pub trait Applier<O> {
    fn apply(self, options: &mut O);
}

impl<O, F> Applier<O> for F
where
    F: FnOnce(&mut O),
{
    fn apply(self, options: &mut O) {
        self(options)
    }
}

/// A type-erased mutator, for lists mixing several option setters.
pub type OptionFn<O> = Box<dyn FnOnce(&mut O) + Send>;

/// Box a mutator as an [`OptionFn`].
pub fn option_fn<O, F>(f: F) -> OptionFn<O>
where
    F: FnOnce(&mut O) + Send + 'static,
{
    Box::new(f)
}

/// Apply `opts` to `options` in iteration order.
pub fn apply_all<O, I>(options: &mut O, opts: I)
where
    I: IntoIterator,
    I::Item: Applier<O>,
{
    for opt in opts {
        opt.apply(options);
    }
}

/// Build an `O` from its default value and `opts`.
pub fn parse<O, I>(opts: I) -> O
where
    O: Default,
    I: IntoIterator,
    I::Item: Applier<O>,
{
    parse_with_defaults(O::default(), opts)
}

/// Build an `O` from `defaults` and `opts`.
pub fn parse_with_defaults<O, I>(defaults: O, opts: I) -> O
where
    I: IntoIterator,
    I::Item: Applier<O>,
{
    let mut options = defaults;
    apply_all(&mut options, opts);
    options
}

/// Builder-style front end over [`parse_with_defaults`], for call sites that
/// collect mutators incrementally.
pub struct Parser<O> {
    defaults: O,
    opts: Vec<OptionFn<O>>,
}

impl<O: Default> Default for Parser<O> {
    fn default() -> Self {
        Self::with_defaults(O::default())
    }
}

impl<O> Parser<O> {
    pub fn with_defaults(defaults: O) -> Self {
        Self {
            defaults,
            opts: Vec::new(),
        }
    }

    /// Queue a mutator. Mutators run in the order they were queued.
    pub fn with<F>(mut self, opt: F) -> Self
    where
        F: FnOnce(&mut O) + Send + 'static,
    {
        self.opts.push(Box::new(opt));
        self
    }

    pub fn parse(self) -> O {
        parse_with_defaults(self.defaults, self.opts)
    }
}
