use std::borrow::Cow;
use std::fmt;

use crate::model::{
    AdSpace, AdSpaceContainer, Advert, Channel, ChannelContainer, Root, User, UserContainer,
    Video, VideoContainer,
};
use crate::security::{Ace, Acl, Grant, Permission, Principal};

/// Kind of object a traversal step lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Videos,
    Video,
    Users,
    User,
    Channels,
    Channel,
    Banners,
    AdSpace,
    Advert,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Root => "root",
            NodeKind::Videos => "video container",
            NodeKind::Video => "video",
            NodeKind::Users => "user container",
            NodeKind::User => "user",
            NodeKind::Channels => "channel container",
            NodeKind::Channel => "channel",
            NodeKind::Banners => "ad space container",
            NodeKind::AdSpace => "ad space",
            NodeKind::Advert => "advert",
        };
        f.write_str(name)
    }
}

/// Borrowed view of one object in the graph.
///
/// Channels are held as `Cow` because a lookup miss produces a virtual
/// channel that is not stored anywhere.
#[derive(Debug, Clone)]
pub enum Node<'a> {
    Root(&'a Root),
    Videos(&'a VideoContainer),
    Video(&'a Video),
    Users(&'a UserContainer),
    User(&'a User),
    Channels(&'a ChannelContainer),
    Channel(Cow<'a, Channel>),
    Banners(&'a AdSpaceContainer),
    AdSpace(&'a AdSpace),
    Advert(&'a Advert),
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Root(_) => NodeKind::Root,
            Node::Videos(_) => NodeKind::Videos,
            Node::Video(_) => NodeKind::Video,
            Node::Users(_) => NodeKind::Users,
            Node::User(_) => NodeKind::User,
            Node::Channels(_) => NodeKind::Channels,
            Node::Channel(_) => NodeKind::Channel,
            Node::Banners(_) => NodeKind::Banners,
            Node::AdSpace(_) => NodeKind::AdSpace,
            Node::Advert(_) => NodeKind::Advert,
        }
    }

    /// Step one key down the graph.
    pub fn child(&self, key: &str) -> Option<Node<'a>> {
        match self {
            Node::Root(root) => {
                let root: &'a Root = *root;
                match key {
                    "videos" => Some(Node::Videos(&root.videos)),
                    "users" => Some(Node::Users(&root.users)),
                    "channels" => Some(Node::Channels(&root.channels)),
                    "banners" => Some(Node::Banners(&root.banners)),
                    _ => None,
                }
            }
            Node::Videos(videos) => {
                let videos: &'a VideoContainer = *videos;
                videos.get(key).map(Node::Video)
            }
            Node::Users(users) => {
                let users: &'a UserContainer = *users;
                users.get(key).map(Node::User)
            }
            Node::Channels(channels) => {
                let channels: &'a ChannelContainer = *channels;
                Some(Node::Channel(channels.lookup(key)))
            }
            Node::Banners(banners) => {
                let banners: &'a AdSpaceContainer = *banners;
                banners.get(key).map(Node::AdSpace)
            }
            Node::AdSpace(space) => {
                let space: &'a AdSpace = *space;
                space.adverts().get(key).map(Node::Advert)
            }
            Node::Video(_) | Node::User(_) | Node::Channel(_) | Node::Advert(_) => None,
        }
    }

    /// The ACL attached to this object, if it carries one.
    pub fn acl(&self) -> Option<Acl> {
        match self {
            Node::Root(_) => Some(vec![
                Ace::allow(Principal::Group("admin".to_string()), Grant::All),
                Ace::allow(Principal::Everyone, Grant::Only(vec![Permission::View])),
            ]),
            Node::User(user) => Some(vec![
                Ace::allow(Principal::Group("admin".to_string()), Grant::All),
                Ace::allow(
                    Principal::User(user.id().to_string()),
                    Grant::Only(vec![Permission::View, Permission::Edit]),
                ),
                Ace::deny(Principal::Everyone, Grant::All),
            ]),
            _ => None,
        }
    }
}

/// Mutable view of one stored object. Virtual channels cannot be reached.
#[derive(Debug)]
pub enum NodeMut<'a> {
    Root(&'a mut Root),
    Videos(&'a mut VideoContainer),
    Video(&'a mut Video),
    Users(&'a mut UserContainer),
    User(&'a mut User),
    Channels(&'a mut ChannelContainer),
    Channel(&'a mut Channel),
    Banners(&'a mut AdSpaceContainer),
    AdSpace(&'a mut AdSpace),
    Advert(&'a mut Advert),
}

impl<'a> NodeMut<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeMut::Root(_) => NodeKind::Root,
            NodeMut::Videos(_) => NodeKind::Videos,
            NodeMut::Video(_) => NodeKind::Video,
            NodeMut::Users(_) => NodeKind::Users,
            NodeMut::User(_) => NodeKind::User,
            NodeMut::Channels(_) => NodeKind::Channels,
            NodeMut::Channel(_) => NodeKind::Channel,
            NodeMut::Banners(_) => NodeKind::Banners,
            NodeMut::AdSpace(_) => NodeKind::AdSpace,
            NodeMut::Advert(_) => NodeKind::Advert,
        }
    }

    pub fn child(self, key: &str) -> Option<NodeMut<'a>> {
        match self {
            NodeMut::Root(root) => match key {
                "videos" => Some(NodeMut::Videos(&mut root.videos)),
                "users" => Some(NodeMut::Users(&mut root.users)),
                "channels" => Some(NodeMut::Channels(&mut root.channels)),
                "banners" => Some(NodeMut::Banners(&mut root.banners)),
                _ => None,
            },
            NodeMut::Videos(videos) => videos.get_mut(key).map(NodeMut::Video),
            NodeMut::Users(users) => users.get_mut(key).map(NodeMut::User),
            NodeMut::Channels(channels) => channels.get_mut(key).map(NodeMut::Channel),
            NodeMut::Banners(banners) => banners.get_mut(key).map(NodeMut::AdSpace),
            NodeMut::AdSpace(space) => space.adverts_mut().get_mut(key).map(NodeMut::Advert),
            NodeMut::Video(_) | NodeMut::User(_) | NodeMut::Channel(_) | NodeMut::Advert(_) => {
                None
            }
        }
    }
}
