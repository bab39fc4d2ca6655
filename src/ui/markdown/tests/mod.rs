mod delimiters;
mod helpers;
mod precedence;
