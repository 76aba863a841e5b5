//! Philosopher slash commands: /set_philosopher, /reset_chat

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

/// Creates philosopher commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_set_philosopher_command(), create_reset_chat_command()]
}

/// Creates the set_philosopher command
fn create_set_philosopher_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("set_philosopher")
        .description("Choose the philosopher to converse with")
        .create_option(|option| {
            option
                .name("name")
                .description("Name of the philosopher")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .to_owned()
}

/// Creates the reset_chat command
fn create_reset_chat_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("reset_chat")
        .description("Reset the conversation context for this channel")
        .to_owned()
}
